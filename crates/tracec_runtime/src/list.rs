//! Dynamic list: a growable array of doubles, indexed from zero.
//!
//! List elements are always plain `f64`s, never observed cells — per spec §9's
//! resolved open question, tracking a trajectory through a list means storing
//! successive values in a separate, explicitly-named [`crate::cell::Cell`].

const INITIAL_CAPACITY: i64 = 8;

/// A growable, heap-backed array of doubles.
#[repr(C)]
pub struct List {
    pub data: *mut f64,
    pub length: i64,
    pub capacity: i64,
}

fn alloc_buffer(capacity: i64) -> *mut f64 {
    if capacity == 0 {
        return std::ptr::null_mut();
    }
    let mut buf: Vec<f64> = vec![0.0; capacity as usize];
    let ptr = buf.as_mut_ptr();
    std::mem::forget(buf);
    ptr
}

/// Allocates a list literal of `length` zero-initialized slots (the code
/// generator then fills each slot with `list_set`, per spec §4.5.2).
#[no_mangle]
pub extern "C" fn list_create(length: i64) -> *mut List {
    let length = length.max(0);
    let capacity = length.max(INITIAL_CAPACITY);
    let data = alloc_buffer(capacity);
    Box::into_raw(Box::new(List { data, length, capacity }))
}

fn bounds_violation(op: &str, idx: i64, length: i64) {
    eprintln!("tracec-runtime: list {op} index {idx} out of bounds (length {length})");
}

/// Reads `list[idx]`. Out-of-bounds or a null list yields `0.0` after
/// printing a diagnostic (spec §4.1/§8 boundary behavior).
#[no_mangle]
pub unsafe extern "C" fn list_get(list: *const List, idx: i64) -> f64 {
    if list.is_null() {
        return 0.0;
    }
    let list = &*list;
    if idx < 0 || idx >= list.length {
        bounds_violation("get", idx, list.length);
        return 0.0;
    }
    *list.data.offset(idx as isize)
}

/// Writes `list[idx] = val`. Out-of-bounds or a null list is a no-op after
/// printing a diagnostic.
#[no_mangle]
pub unsafe extern "C" fn list_set(list: *mut List, idx: i64, val: f64) {
    if list.is_null() {
        return;
    }
    let list = &mut *list;
    if idx < 0 || idx >= list.length {
        bounds_violation("set", idx, list.length);
        return;
    }
    *list.data.offset(idx as isize) = val;
}

/// Appends `val`, growing the backing buffer by doubling when full.
#[no_mangle]
pub unsafe extern "C" fn list_append(list: *mut List, val: f64) {
    if list.is_null() {
        return;
    }
    let list = &mut *list;
    if list.length == list.capacity {
        let new_capacity = if list.capacity == 0 { INITIAL_CAPACITY } else { list.capacity * 2 };
        let new_data = alloc_buffer(new_capacity);
        if !list.data.is_null() && list.length > 0 {
            std::ptr::copy_nonoverlapping(list.data, new_data, list.length as usize);
        }
        if !list.data.is_null() {
            drop(Vec::from_raw_parts(list.data, list.length as usize, list.capacity as usize));
        }
        list.data = new_data;
        list.capacity = new_capacity;
    }
    *list.data.offset(list.length as isize) = val;
    list.length += 1;
}

/// Returns the current length, or `0` for a null list.
#[no_mangle]
pub unsafe extern "C" fn list_length(list: *const List) -> i64 {
    if list.is_null() {
        0
    } else {
        (*list).length
    }
}

/// Frees the backing buffer and the list header.
///
/// # Safety
///
/// `list` must have been returned by [`list_create`] and not already freed.
#[no_mangle]
pub unsafe extern "C" fn list_destroy(list: *mut List) {
    if list.is_null() {
        return;
    }
    let boxed = Box::from_raw(list);
    if !boxed.data.is_null() {
        drop(Vec::from_raw_parts(boxed.data, boxed.length as usize, boxed.capacity as usize));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_values() {
        let n = 64;
        let list = list_create(n);
        unsafe {
            for i in 0..n {
                list_set(list, i, i as f64 * 1.5);
            }
            for i in 0..n {
                assert_eq!(list_get(list, i), i as f64 * 1.5);
            }
            list_destroy(list);
        }
    }

    #[test]
    fn negative_index_returns_zero() {
        let list = list_create(4);
        unsafe {
            assert_eq!(list_get(list, -1), 0.0);
            list_destroy(list);
        }
    }

    #[test]
    fn out_of_bounds_index_returns_zero() {
        let list = list_create(4);
        unsafe {
            assert_eq!(list_get(list, 100), 0.0);
            list_destroy(list);
        }
    }

    #[test]
    fn append_grows_by_doubling() {
        let list = list_create(0);
        unsafe {
            for i in 0..20 {
                list_append(list, i as f64);
            }
            assert_eq!(list_length(list), 20);
            for i in 0..20 {
                assert_eq!(list_get(list, i), i as f64);
            }
            list_destroy(list);
        }
    }

    #[test]
    fn list_literal_style_construction() {
        let list = list_create(3);
        unsafe {
            list_set(list, 0, 10.0);
            list_set(list, 1, 20.0);
            list_set(list, 2, 30.0);
            assert_eq!(list_get(list, 1), 20.0);
            list_destroy(list);
        }
    }

    #[test]
    fn null_list_operations_are_safe_no_ops() {
        unsafe {
            let null: *mut List = std::ptr::null_mut();
            assert_eq!(list_get(null, 0), 0.0);
            list_set(null, 0, 1.0);
            list_append(null, 1.0);
            assert_eq!(list_length(null), 0);
            list_destroy(null);
        }
    }
}
