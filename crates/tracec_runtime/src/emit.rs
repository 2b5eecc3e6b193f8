//! An embedded C translation of this crate, linked in instead of the native
//! Rust staticlib when a compilation targets a plain C toolchain rather than
//! the host Rust linker.
//!
//! Grounded in the teacher's `codegen_c::runtime::C_RUNTIME` — a raw string
//! constant compiled alongside emitted C, rather than a second maintained
//! implementation shipped as its own crate. Every threshold and struct field
//! here must track [`crate::cell`], [`crate::list`], and [`crate::string`]
//! exactly; they are the single source of truth and this file is derived
//! from them by hand.

/// C source for the runtime ABI, suitable for compiling alongside LIR that
/// has been lowered to C rather than assembled directly.
pub const C_RUNTIME: &str = r#"
#include <stdio.h>
#include <stdlib.h>
#include <stdint.h>
#include <stdbool.h>
#include <string.h>
#include <math.h>

/* ========== Cell ========== */

#define TRACE_HISTORY_CAPACITY 100
#define TRACE_CONVERGED_EPSILON 1e-6
#define TRACE_DIVERGE_VALUE_THRESHOLD 1e3
#define TRACE_STABLE_THRESHOLD 0.8

typedef struct {
    double value;
    double gradient;
    double stability;
    int64_t iteration;
    double prev_value;
    double prev_gradient;
    double history[TRACE_HISTORY_CAPACITY];
    int history_size;
    int history_index;
} Cell;

static void trace_cell_push_history(Cell *c, double v) {
    c->history[c->history_index] = v;
    c->history_index = (c->history_index + 1) % TRACE_HISTORY_CAPACITY;
    if (c->history_size < TRACE_HISTORY_CAPACITY) c->history_size++;
}

Cell *cell_create(double v) {
    Cell *c = (Cell *)calloc(1, sizeof(Cell));
    if (!c) return NULL;
    c->value = v;
    c->prev_value = v;
    trace_cell_push_history(c, v);
    return c;
}

void cell_init(Cell *c, double v) {
    if (!c) return;
    memset(c, 0, sizeof(Cell));
    c->value = v;
    c->prev_value = v;
    c->history[0] = v;
    c->history_size = 1;
    c->history_index = 1 % TRACE_HISTORY_CAPACITY;
}

void cell_update(Cell *c, double v) {
    if (!c) return;
    double old_gradient = c->gradient;
    double gradient = v - c->prev_value;
    double acceleration = gradient - old_gradient;
    c->stability = exp(-fabs(acceleration));
    c->prev_value = c->value;
    c->value = v;
    c->gradient = gradient;
    c->prev_gradient = old_gradient;
    c->iteration += 1;
    trace_cell_push_history(c, v);
}

double cell_value(const Cell *c) { return c ? c->value : 0.0; }
double cell_gradient(const Cell *c) { return c ? c->gradient : 0.0; }
double cell_stability(const Cell *c) { return c ? c->stability : 0.0; }
int64_t cell_iteration(const Cell *c) { return c ? c->iteration : 0; }

static double trace_history_at(const Cell *c, int back) {
    int idx = (c->history_index - 1 - back + 2 * TRACE_HISTORY_CAPACITY) % TRACE_HISTORY_CAPACITY;
    return c->history[idx];
}

bool converged(const Cell *c) {
    if (!c || c->history_size < 5) return false;
    double lo = INFINITY, hi = -INFINITY;
    for (int i = 0; i < 5; i++) {
        double v = trace_history_at(c, i);
        if (v < lo) lo = v;
        if (v > hi) hi = v;
    }
    return (hi - lo) < TRACE_CONVERGED_EPSILON;
}

bool diverging(const Cell *c) {
    if (!c) return false;
    if (fabs(c->value) > TRACE_DIVERGE_VALUE_THRESHOLD) return true;
    if (c->history_size < 6) return false;
    int growing = 0;
    for (int i = 0; i < 4; i++) {
        double newer = fabs(trace_history_at(c, i) - trace_history_at(c, i + 1));
        double older = fabs(trace_history_at(c, i + 1) - trace_history_at(c, i + 2));
        if (newer > older * 1.2) growing++;
    }
    return growing >= 3;
}

bool oscillating(const Cell *c) {
    if (!c || c->history_size < 10) return false;
    int changes = 0;
    double prev_gradient = trace_history_at(c, 0) - trace_history_at(c, 1);
    for (int i = 1; i < 9; i++) {
        double g = trace_history_at(c, i) - trace_history_at(c, i + 1);
        if ((g > 0) != (prev_gradient > 0) && g != 0 && prev_gradient != 0) changes++;
        prev_gradient = g;
    }
    return changes >= 3;
}

bool stable(const Cell *c) { return c && c->stability > TRACE_STABLE_THRESHOLD; }
bool improving(const Cell *c) { return c && fabs(c->gradient) < fabs(c->prev_gradient); }

/* ========== List ========== */

#define TRACE_LIST_INITIAL_CAPACITY 8

typedef struct {
    double *data;
    int64_t length;
    int64_t capacity;
} List;

List *list_create(int64_t length) {
    if (length < 0) length = 0;
    int64_t capacity = length > TRACE_LIST_INITIAL_CAPACITY ? length : TRACE_LIST_INITIAL_CAPACITY;
    List *l = (List *)malloc(sizeof(List));
    l->data = capacity > 0 ? (double *)calloc(capacity, sizeof(double)) : NULL;
    l->length = length;
    l->capacity = capacity;
    return l;
}

double list_get(const List *l, int64_t idx) {
    if (!l) return 0.0;
    if (idx < 0 || idx >= l->length) {
        fprintf(stderr, "tracec-runtime: list get index %" PRId64 " out of bounds (length %" PRId64 ")\n", idx, l->length);
        return 0.0;
    }
    return l->data[idx];
}

void list_set(List *l, int64_t idx, double val) {
    if (!l) return;
    if (idx < 0 || idx >= l->length) {
        fprintf(stderr, "tracec-runtime: list set index %" PRId64 " out of bounds (length %" PRId64 ")\n", idx, l->length);
        return;
    }
    l->data[idx] = val;
}

void list_append(List *l, double val) {
    if (!l) return;
    if (l->length == l->capacity) {
        int64_t new_capacity = l->capacity == 0 ? TRACE_LIST_INITIAL_CAPACITY : l->capacity * 2;
        l->data = (double *)realloc(l->data, new_capacity * sizeof(double));
        l->capacity = new_capacity;
    }
    l->data[l->length++] = val;
}

int64_t list_length(const List *l) { return l ? l->length : 0; }

void list_destroy(List *l) {
    if (!l) return;
    free(l->data);
    free(l);
}

/* ========== String ========== */

typedef struct {
    char *data;
    int64_t length;
    int64_t capacity;
} TraceString;

static TraceString *trace_string_with_capacity(int64_t capacity) {
    TraceString *s = (TraceString *)malloc(sizeof(TraceString));
    s->data = (char *)malloc(capacity + 1);
    s->data[0] = '\0';
    s->length = 0;
    s->capacity = capacity;
    return s;
}

TraceString *string_create(const char *ptr) {
    int64_t len = (int64_t)strlen(ptr);
    TraceString *s = trace_string_with_capacity(len > 0 ? len : 8);
    memcpy(s->data, ptr, len + 1);
    s->length = len;
    return s;
}

void string_destroy(TraceString *s) {
    if (!s) return;
    free(s->data);
    free(s);
}

int64_t string_length(const TraceString *s) { return s ? s->length : 0; }

uint8_t string_char_at(const TraceString *s, int64_t idx) {
    if (!s || idx < 0 || idx >= s->length) return 0;
    return (uint8_t)s->data[idx];
}

TraceString *string_substring(const TraceString *s, int64_t start, int64_t end) {
    if (!s) return string_create("");
    if (start < 0) start = 0;
    if (end > s->length) end = s->length;
    if (end < start) end = start;
    int64_t len = end - start;
    TraceString *out = trace_string_with_capacity(len > 0 ? len : 8);
    memcpy(out->data, s->data + start, len);
    out->data[len] = '\0';
    out->length = len;
    return out;
}

TraceString *string_concat(const TraceString *a, const TraceString *b) {
    int64_t la = a ? a->length : 0;
    int64_t lb = b ? b->length : 0;
    TraceString *out = trace_string_with_capacity(la + lb > 0 ? la + lb : 8);
    if (a) memcpy(out->data, a->data, la);
    if (b) memcpy(out->data + la, b->data, lb);
    out->data[la + lb] = '\0';
    out->length = la + lb;
    return out;
}

void string_append_char(TraceString *s, uint8_t ch) {
    if (!s) return;
    if (s->length + 1 > s->capacity) {
        int64_t new_capacity = s->capacity == 0 ? 8 : s->capacity * 2;
        s->data = (char *)realloc(s->data, new_capacity + 1);
        s->capacity = new_capacity;
    }
    s->data[s->length] = (char)ch;
    s->length += 1;
    s->data[s->length] = '\0';
}

int64_t string_compare(const TraceString *a, const TraceString *b) {
    int64_t la = a ? a->length : 0, lb = b ? b->length : 0;
    int64_t n = la < lb ? la : lb;
    int cmp = memcmp(a ? a->data : "", b ? b->data : "", (size_t)n);
    if (cmp != 0) return cmp < 0 ? -1 : 1;
    if (la < lb) return -1;
    if (la > lb) return 1;
    return 0;
}

bool string_equals(const TraceString *a, const TraceString *b) { return string_compare(a, b) == 0; }

int64_t string_find(const TraceString *haystack, const TraceString *needle, int64_t start) {
    if (!haystack) return -1;
    int64_t nlen = needle ? needle->length : 0;
    if (nlen == 0) return start <= haystack->length ? start : -1;
    if (start < 0) start = 0;
    for (int64_t i = start; i + nlen <= haystack->length; i++) {
        if (memcmp(haystack->data + i, needle->data, (size_t)nlen) == 0) return i;
    }
    return -1;
}

bool trace_is_digit(uint8_t ch) { return ch >= '0' && ch <= '9'; }
bool trace_is_alpha(uint8_t ch) { return (ch >= 'a' && ch <= 'z') || (ch >= 'A' && ch <= 'Z') || ch == '_'; }
bool trace_is_alnum(uint8_t ch) { return trace_is_digit(ch) || trace_is_alpha(ch); }
bool trace_is_whitespace(uint8_t ch) { return ch == ' ' || ch == '\t' || ch == '\r'; }
bool trace_is_newline(uint8_t ch) { return ch == '\n'; }

TraceString *char_to_string(uint8_t ch) {
    TraceString *s = trace_string_with_capacity(1);
    s->data[0] = (char)ch;
    s->data[1] = '\0';
    s->length = 1;
    return s;
}

TraceString *number_to_string(double n) {
    char buf[64];
    if (isnan(n)) {
        snprintf(buf, sizeof buf, "nan");
    } else if (isinf(n)) {
        snprintf(buf, sizeof buf, n > 0 ? "inf" : "-inf");
    } else {
        snprintf(buf, sizeof buf, "%.6e", n);
    }
    return string_create(buf);
}

double string_to_number(const TraceString *s) {
    if (!s) return NAN;
    char *end = NULL;
    double v = strtod(s->data, &end);
    if (end == s->data) return NAN;
    return v;
}

/* ========== Printing ========== */

void print_f64(double n) {
    if (isnan(n)) {
        printf("nan\n");
    } else if (isinf(n)) {
        printf(n > 0 ? "inf\n" : "-inf\n");
    } else if (n == (int64_t)n && fabs(n) < 1e15) {
        printf("%.1f\n", n);
    } else {
        char buf[64];
        snprintf(buf, sizeof buf, "%.6e", n);
        printf("%s\n", buf);
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_runtime_declares_every_abi_symbol() {
        for symbol in [
            "cell_create", "cell_init", "cell_update", "cell_value", "cell_gradient", "cell_stability",
            "cell_iteration", "converged", "diverging", "oscillating", "stable", "improving", "list_create",
            "list_get", "list_set", "list_append", "list_length", "list_destroy", "string_create",
            "string_destroy", "string_length", "string_char_at", "string_substring", "string_concat",
            "string_append_char", "string_compare", "string_equals", "string_find", "number_to_string",
            "string_to_number", "char_to_string", "print_f64",
        ] {
            assert!(C_RUNTIME.contains(symbol), "embedded C runtime is missing `{symbol}`");
        }
    }
}
