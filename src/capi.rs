//! Flat C interface.
//!
//! A handle is a `*mut Matrix<V>` obtained from `ml_allocate_*`, `ml_construct_*`
//! or `ml_identity_*` and released exactly once with the matching `ml_destroy_*`.
//! Operations write into a caller-provided destination handle and return `false`
//! without touching it on failure. The destination may be one of the operands.
//! Null handles are failures. Panics never cross the boundary.

use crate::error::MatrixResult;
use crate::matrix::element::{Element, Promote, Promoted};
use crate::matrix::matrix::Matrix;
use log::warn;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

fn guarded<T>(name: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(_) => {
            warn!("{}: caught panic", name);
            fallback
        }
    }
}

fn null_handle(name: &str) -> bool {
    warn!("{}: null matrix handle", name);
    false
}

/// Runs a core call, logging and discarding its error.
fn attempt<X>(name: &str, compute: impl FnOnce() -> MatrixResult<X>) -> Option<X> {
    guarded(name, None, || match compute() {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("{}: {}", name, error);
            None
        }
    })
}

/// Overwrites the matrix behind `dst` with a computed result.
///
/// `dst` must be non-null, and no reference into any operand may outlive
/// the computation: `dst` is allowed to alias a source handle.
unsafe fn store<X: Element>(dst: *mut Matrix<X>, result: Option<Matrix<X>>) -> bool {
    match result {
        Some(value) => {
            unsafe { *dst = value };
            true
        }
        None => false,
    }
}

fn new_handle<V: Element>(matrix: Matrix<V>) -> *mut Matrix<V> {
    Box::into_raw(Box::new(matrix))
}

fn new_handle_or_null<V: Element>(
    name: &str,
    build: impl FnOnce() -> MatrixResult<Matrix<V>>,
) -> *mut Matrix<V> {
    attempt(name, build).map_or(ptr::null_mut(), new_handle)
}

unsafe fn destroy<V: Element>(handle: *mut Matrix<V>) {
    if !handle.is_null() {
        guarded("destroy", (), || drop(unsafe { Box::from_raw(handle) }));
    }
}

unsafe fn row_count<V: Element>(handle: *const Matrix<V>) -> usize {
    guarded("row_count", 0, || {
        unsafe { handle.as_ref() }.map_or(0, |m| m.rows())
    })
}

unsafe fn col_count<V: Element>(handle: *const Matrix<V>) -> usize {
    guarded("col_count", 0, || {
        unsafe { handle.as_ref() }.map_or(0, |m| m.cols())
    })
}

unsafe fn get<V: Element>(handle: *const Matrix<V>, row: usize, col: usize, out: *mut V) -> bool {
    let Some(out) = (unsafe { out.as_mut() }) else {
        return null_handle("get");
    };
    *out = V::zero();
    let Some(matrix) = (unsafe { handle.as_ref() }) else {
        return null_handle("get");
    };
    match attempt("get", || matrix.get(row, col)) {
        Some(value) => {
            *out = value;
            true
        }
        None => false,
    }
}

unsafe fn set<V: Element>(handle: *mut Matrix<V>, row: usize, col: usize, value: V) -> bool {
    let Some(matrix) = (unsafe { handle.as_mut() }) else {
        return null_handle("set");
    };
    attempt("set", || matrix.set(row, col, value)).is_some()
}

unsafe fn copy<V: Element>(dst: *mut Matrix<V>, src: *const Matrix<V>) -> bool {
    if ptr::eq(dst, src) {
        return !dst.is_null();
    }
    unsafe { unary("copy", dst, src, |m| Ok(m.clone())) }
}

unsafe fn take<V: Element>(dst: *mut Matrix<V>, src: *mut Matrix<V>) -> bool {
    if ptr::eq(dst, src) {
        return !dst.is_null();
    }
    if dst.is_null() {
        return null_handle("move");
    }
    let Some(src) = (unsafe { src.as_mut() }) else {
        return null_handle("move");
    };
    let value = std::mem::take(src);
    unsafe { store(dst, Some(value)) }
}

unsafe fn binary<V, W>(
    name: &str,
    dst: *mut Matrix<Promoted<V, W>>,
    lhs: *const Matrix<V>,
    rhs: *const Matrix<W>,
    op: impl FnOnce(&Matrix<V>, &Matrix<W>) -> MatrixResult<Matrix<Promoted<V, W>>>,
) -> bool
where
    V: Promote<W>,
    W: Element,
{
    if dst.is_null() {
        return null_handle(name);
    }
    let result = match (unsafe { lhs.as_ref() }, unsafe { rhs.as_ref() }) {
        (Some(lhs), Some(rhs)) => attempt(name, || op(lhs, rhs)),
        _ => return null_handle(name),
    };
    unsafe { store(dst, result) }
}

unsafe fn eval<V, W>(
    out: *mut Promoted<V, W>,
    handle: *const Matrix<V>,
    len: usize,
    input: *const W,
) -> bool
where
    V: Promote<W>,
    W: Element,
{
    let Some(matrix) = (unsafe { handle.as_ref() }) else {
        return null_handle("eval");
    };
    if len != matrix.cols() {
        warn!(
            "eval: vector of length {} against {} columns",
            len,
            matrix.cols()
        );
        return false;
    }
    if (len > 0 && input.is_null()) || (matrix.rows() > 0 && out.is_null()) {
        return null_handle("eval");
    }

    let input: &[W] = if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(input, len) }
    };
    let Some(result) = attempt("eval", || matrix.eval(input)) else {
        return false;
    };
    if !result.is_empty() {
        unsafe { std::slice::from_raw_parts_mut(out, result.len()) }.copy_from_slice(&result);
    }
    true
}

unsafe fn unary<V: Element, X: Element>(
    name: &str,
    dst: *mut Matrix<X>,
    src: *const Matrix<V>,
    op: impl FnOnce(&Matrix<V>) -> MatrixResult<Matrix<X>>,
) -> bool {
    if dst.is_null() {
        return null_handle(name);
    }
    let result = match unsafe { src.as_ref() } {
        Some(src) => attempt(name, || op(src)),
        None => return null_handle(name),
    };
    unsafe { store(dst, result) }
}

unsafe fn is_rref<V: Element>(handle: *const Matrix<V>) -> bool {
    match unsafe { handle.as_ref() } {
        Some(matrix) => guarded("is_rref", false, || matrix.is_rref()),
        None => null_handle("is_rref"),
    }
}

unsafe fn compare<V, W>(lhs: *const Matrix<V>, rhs: *const Matrix<W>) -> bool
where
    V: Promote<W>,
    W: Element,
{
    match (unsafe { lhs.as_ref() }, unsafe { rhs.as_ref() }) {
        (Some(lhs), Some(rhs)) => guarded("compare", false, || lhs == rhs),
        _ => null_handle("compare"),
    }
}

// Exports every single-width entry point for one element type.
macro_rules! export_width {
    (
        $v:ty,
        size_of: $size_of:ident,
        allocate: $allocate:ident,
        construct: $construct:ident,
        identity: $identity:ident,
        destroy: $destroy:ident,
        row_count: $row_count:ident,
        col_count: $col_count:ident,
        get: $get:ident,
        set: $set:ident,
        copy: $copy:ident,
        move: $move:ident,
        echelon: $echelon:ident,
        inverse: $inverse:ident,
        is_rref: $is_rref:ident $(,)?
    ) => {
        /// Size in bytes of the matrix a handle points to.
        #[no_mangle]
        pub extern "C" fn $size_of() -> usize {
            guarded(stringify!($size_of), 0, std::mem::size_of::<Matrix<$v>>)
        }

        /// New 0 x 0 matrix.
        #[no_mangle]
        pub extern "C" fn $allocate() -> *mut Matrix<$v> {
            new_handle_or_null(stringify!($allocate), || Ok(Matrix::<$v>::empty()))
        }

        /// New zero-filled `rows` x `cols` matrix, or null when it does not fit in memory.
        #[no_mangle]
        pub extern "C" fn $construct(rows: usize, cols: usize) -> *mut Matrix<$v> {
            new_handle_or_null(stringify!($construct), || Matrix::<$v>::try_new(rows, cols))
        }

        /// New `n` x `n` identity matrix, or null when it does not fit in memory.
        #[no_mangle]
        pub extern "C" fn $identity(n: usize) -> *mut Matrix<$v> {
            new_handle_or_null(stringify!($identity), || Matrix::<$v>::try_identity(n))
        }

        /// # Safety
        /// `handle` is null or came from this library and was not destroyed yet.
        #[no_mangle]
        pub unsafe extern "C" fn $destroy(handle: *mut Matrix<$v>) {
            unsafe { destroy(handle) }
        }

        /// # Safety
        /// `handle` is null or a live handle.
        #[no_mangle]
        pub unsafe extern "C" fn $row_count(handle: *const Matrix<$v>) -> usize {
            unsafe { row_count(handle) }
        }

        /// # Safety
        /// `handle` is null or a live handle.
        #[no_mangle]
        pub unsafe extern "C" fn $col_count(handle: *const Matrix<$v>) -> usize {
            unsafe { col_count(handle) }
        }

        /// Reads one element into `out`; writes 0 and returns false when out of range.
        ///
        /// # Safety
        /// `handle` is null or a live handle, `out` is null or writable.
        #[no_mangle]
        pub unsafe extern "C" fn $get(
            handle: *const Matrix<$v>,
            row: usize,
            col: usize,
            out: *mut $v,
        ) -> bool {
            unsafe { get(handle, row, col, out) }
        }

        /// # Safety
        /// `handle` is null or a live handle.
        #[no_mangle]
        pub unsafe extern "C" fn $set(
            handle: *mut Matrix<$v>,
            row: usize,
            col: usize,
            value: $v,
        ) -> bool {
            unsafe { set(handle, row, col, value) }
        }

        /// dst <- src
        ///
        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $copy(dst: *mut Matrix<$v>, src: *const Matrix<$v>) -> bool {
            unsafe { copy(dst, src) }
        }

        /// dst <- src, leaving src as a 0 x 0 matrix.
        ///
        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $move(dst: *mut Matrix<$v>, src: *mut Matrix<$v>) -> bool {
            unsafe { take(dst, src) }
        }

        /// dst <- echelon(src)
        ///
        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $echelon(dst: *mut Matrix<$v>, src: *const Matrix<$v>) -> bool {
            unsafe { unary(stringify!($echelon), dst, src, |m| Ok(m.echelon())) }
        }

        /// dst <- inverse(src). Fails for non-square matrices.
        ///
        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $inverse(dst: *mut Matrix<$v>, src: *const Matrix<$v>) -> bool {
            unsafe { unary(stringify!($inverse), dst, src, |m| m.inverse()) }
        }

        /// # Safety
        /// `handle` is null or a live handle.
        #[no_mangle]
        pub unsafe extern "C" fn $is_rref(handle: *const Matrix<$v>) -> bool {
            unsafe { is_rref(handle) }
        }
    };
}

// Exports every binary entry point for one ordered pair of element types.
macro_rules! export_pair {
    (
        $v:ty, $w:ty => $x:ty,
        add: $add:ident,
        sub: $sub:ident,
        mul: $mul:ident,
        eval: $eval:ident,
        mul_scalar: $mul_scalar:ident,
        div_scalar: $div_scalar:ident,
        augment: $augment:ident,
        compare: $compare:ident $(,)?
    ) => {
        /// dst <- lhs + rhs
        ///
        /// # Safety
        /// All handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $add(
            dst: *mut Matrix<$x>,
            lhs: *const Matrix<$v>,
            rhs: *const Matrix<$w>,
        ) -> bool {
            unsafe { binary(stringify!($add), dst, lhs, rhs, |l, r| l + r) }
        }

        /// dst <- lhs - rhs
        ///
        /// # Safety
        /// All handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $sub(
            dst: *mut Matrix<$x>,
            lhs: *const Matrix<$v>,
            rhs: *const Matrix<$w>,
        ) -> bool {
            unsafe { binary(stringify!($sub), dst, lhs, rhs, |l, r| l - r) }
        }

        /// dst <- lhs * rhs
        ///
        /// # Safety
        /// All handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $mul(
            dst: *mut Matrix<$x>,
            lhs: *const Matrix<$v>,
            rhs: *const Matrix<$w>,
        ) -> bool {
            unsafe { binary(stringify!($mul), dst, lhs, rhs, |l, r| l * r) }
        }

        /// out <- matrix * input, where `input` holds `len` elements and `out`
        /// has room for one element per row.
        ///
        /// # Safety
        /// `matrix` is null or live; `input` and `out` are valid for those lengths.
        #[no_mangle]
        pub unsafe extern "C" fn $eval(
            out: *mut $x,
            matrix: *const Matrix<$v>,
            len: usize,
            input: *const $w,
        ) -> bool {
            unsafe { eval(out, matrix, len, input) }
        }

        /// dst <- src * scalar
        ///
        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $mul_scalar(
            dst: *mut Matrix<$x>,
            src: *const Matrix<$v>,
            scalar: $w,
        ) -> bool {
            unsafe { unary(stringify!($mul_scalar), dst, src, |m| Ok(m * scalar)) }
        }

        /// dst <- src / scalar
        ///
        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $div_scalar(
            dst: *mut Matrix<$x>,
            src: *const Matrix<$v>,
            scalar: $w,
        ) -> bool {
            unsafe { unary(stringify!($div_scalar), dst, src, |m| Ok(m / scalar)) }
        }

        /// dst <- [lhs | rhs]
        ///
        /// # Safety
        /// All handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $augment(
            dst: *mut Matrix<$x>,
            lhs: *const Matrix<$v>,
            rhs: *const Matrix<$w>,
        ) -> bool {
            unsafe { binary(stringify!($augment), dst, lhs, rhs, |l, r| l.augment(r)) }
        }

        /// # Safety
        /// Both handles are null or live.
        #[no_mangle]
        pub unsafe extern "C" fn $compare(lhs: *const Matrix<$v>, rhs: *const Matrix<$w>) -> bool {
            unsafe { compare(lhs, rhs) }
        }
    };
}

export_width!(
    f32,
    size_of: ml_size_of_f32,
    allocate: ml_allocate_f32,
    construct: ml_construct_f32,
    identity: ml_identity_f32,
    destroy: ml_destroy_f32,
    row_count: ml_row_count_f32,
    col_count: ml_col_count_f32,
    get: ml_get_f32,
    set: ml_set_f32,
    copy: ml_copy_f32,
    move: ml_move_f32,
    echelon: ml_echelon_f32,
    inverse: ml_inverse_f32,
    is_rref: ml_is_rref_f32,
);

export_width!(
    f64,
    size_of: ml_size_of_f64,
    allocate: ml_allocate_f64,
    construct: ml_construct_f64,
    identity: ml_identity_f64,
    destroy: ml_destroy_f64,
    row_count: ml_row_count_f64,
    col_count: ml_col_count_f64,
    get: ml_get_f64,
    set: ml_set_f64,
    copy: ml_copy_f64,
    move: ml_move_f64,
    echelon: ml_echelon_f64,
    inverse: ml_inverse_f64,
    is_rref: ml_is_rref_f64,
);

export_pair!(
    f32, f32 => f32,
    add: ml_add_f32_f32,
    sub: ml_sub_f32_f32,
    mul: ml_mul_f32_f32,
    eval: ml_eval_f32_f32,
    mul_scalar: ml_mul_scalar_f32_f32,
    div_scalar: ml_div_scalar_f32_f32,
    augment: ml_augment_f32_f32,
    compare: ml_compare_f32_f32,
);

export_pair!(
    f32, f64 => f64,
    add: ml_add_f32_f64,
    sub: ml_sub_f32_f64,
    mul: ml_mul_f32_f64,
    eval: ml_eval_f32_f64,
    mul_scalar: ml_mul_scalar_f32_f64,
    div_scalar: ml_div_scalar_f32_f64,
    augment: ml_augment_f32_f64,
    compare: ml_compare_f32_f64,
);

export_pair!(
    f64, f32 => f64,
    add: ml_add_f64_f32,
    sub: ml_sub_f64_f32,
    mul: ml_mul_f64_f32,
    eval: ml_eval_f64_f32,
    mul_scalar: ml_mul_scalar_f64_f32,
    div_scalar: ml_div_scalar_f64_f32,
    augment: ml_augment_f64_f32,
    compare: ml_compare_f64_f32,
);

export_pair!(
    f64, f64 => f64,
    add: ml_add_f64_f64,
    sub: ml_sub_f64_f64,
    mul: ml_mul_f64_f64,
    eval: ml_eval_f64_f64,
    mul_scalar: ml_mul_scalar_f64_f64,
    div_scalar: ml_div_scalar_f64_f64,
    augment: ml_augment_f64_f64,
    compare: ml_compare_f64_f64,
);

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
