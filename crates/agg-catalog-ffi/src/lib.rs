// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! C-compatible bindings for the aggregation catalog.
//!
//! Every entry point returns an `int` status code (see
//! [`agg_catalog::Status`]) and writes results through out-parameters. Out
//! pointers are checked before the catalog is touched, so a call that fails
//! on a bad argument never leaves a half-applied change behind.
#![allow(unsafe_code)]
#![deny(missing_docs)]

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::slice;

use agg_catalog::{
    Catalog, CatalogConfig, ContainerId, DimensionId, FragmentField, Handle, Status, VariableId,
};

/// Opaque catalog pointer exposed over the C ABI.
pub struct AggCatalog {
    inner: Catalog,
}

/// Field selector for [`agg_set_fragment_field`] / [`agg_inq_fragment_field`].
pub const AGG_FRAGMENT_ADDRESS: c_int = 0;
/// Field selector for the fragment location.
pub const AGG_FRAGMENT_LOCATION: c_int = 1;
/// Field selector for the fragment file.
pub const AGG_FRAGMENT_FILE: c_int = 2;
/// Field selector for the fragment format.
pub const AGG_FRAGMENT_FORMAT: c_int = 3;

type FfiResult = Result<(), Status>;

fn guard(body: impl FnOnce() -> FfiResult) -> c_int {
    match body() {
        Ok(()) => Status::Ok.code(),
        Err(status) => status.code(),
    }
}

unsafe fn catalog_ref<'a>(catalog: *const AggCatalog) -> Result<&'a Catalog, Status> {
    unsafe { catalog.as_ref() }
        .map(|c| &c.inner)
        .ok_or(Status::InvalidArgument)
}

unsafe fn catalog_mut<'a>(catalog: *mut AggCatalog) -> Result<&'a mut Catalog, Status> {
    unsafe { catalog.as_mut() }
        .map(|c| &mut c.inner)
        .ok_or(Status::InvalidArgument)
}

unsafe fn out_ref<'a, T>(out: *mut T) -> Result<&'a mut T, Status> {
    unsafe { out.as_mut() }.ok_or(Status::InvalidArgument)
}

unsafe fn c_str<'a>(ptr: *const c_char) -> Result<&'a str, Status> {
    if ptr.is_null() {
        return Err(Status::InvalidArgument);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| Status::InvalidArgument)
}

/// Negative handles can never name a row.
fn handle<H: Handle>(raw: c_int) -> Result<H, Status> {
    u32::try_from(raw)
        .map(H::from_raw)
        .map_err(|_| Status::NotFound)
}

fn to_c<H: Handle>(handle: H) -> Result<c_int, Status> {
    c_int::try_from(handle.raw()).map_err(|_| Status::Memory)
}

fn count_to_c(count: usize) -> Result<c_int, Status> {
    c_int::try_from(count).map_err(|_| Status::Memory)
}

fn fragment_field(raw: c_int) -> Result<FragmentField, Status> {
    match raw {
        AGG_FRAGMENT_ADDRESS => Ok(FragmentField::Address),
        AGG_FRAGMENT_LOCATION => Ok(FragmentField::Location),
        AGG_FRAGMENT_FILE => Ok(FragmentField::File),
        AGG_FRAGMENT_FORMAT => Ok(FragmentField::Format),
        _ => Err(Status::InvalidArgument),
    }
}

/// Copies `values` into a caller buffer of `capacity` entries.
unsafe fn fill<H: Handle>(out: *mut c_int, capacity: usize, values: &[H]) -> FfiResult {
    if values.len() > capacity {
        return Err(Status::InvalidArgument);
    }
    if values.is_empty() {
        return Ok(());
    }
    if out.is_null() {
        return Err(Status::InvalidArgument);
    }
    let buffer = unsafe { slice::from_raw_parts_mut(out, values.len()) };
    for (slot, value) in buffer.iter_mut().zip(values) {
        *slot = to_c(*value)?;
    }
    Ok(())
}

/// Creates an empty catalog with default sizing.
///
/// # Safety
/// The caller assumes ownership of the returned pointer and must release it
/// via [`agg_catalog_free`] to avoid leaking memory.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_catalog_new() -> *mut AggCatalog {
    Box::into_raw(Box::new(AggCatalog {
        inner: Catalog::new(),
    }))
}

/// Creates an empty catalog whose stores hold at most `max_rows` rows each
/// (`0` means unbounded).
///
/// # Safety
/// Same ownership rules as [`agg_catalog_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_catalog_new_bounded(
    initial_capacity: usize,
    max_rows: usize,
) -> *mut AggCatalog {
    let config = CatalogConfig {
        initial_capacity,
        max_rows: (max_rows > 0).then_some(max_rows),
    };
    Box::into_raw(Box::new(AggCatalog {
        inner: Catalog::with_config(config),
    }))
}

/// Releases a catalog created by [`agg_catalog_new`].
///
/// # Safety
/// `catalog` must be a pointer previously returned by a constructor that has
/// not already been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_catalog_free(catalog: *mut AggCatalog) {
    if catalog.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(catalog));
    }
}

/// Creates a root container for the aggregation file at `path`.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `path` must reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_create_root(
    catalog: *mut AggCatalog,
    path: *const c_char,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_mut(catalog) }?;
        let path = unsafe { c_str(path) }?;
        let out = unsafe { out_ref(out_id) }?;
        *out = to_c(catalog.create_root(path)?)?;
        Ok(())
    })
}

/// Defines a container named `name` inside `parent`.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `name` must reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_def_cont(
    catalog: *mut AggCatalog,
    parent: c_int,
    name: *const c_char,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_mut(catalog) }?;
        let name = unsafe { c_str(name) }?;
        let out = unsafe { out_ref(out_id) }?;
        let parent: ContainerId = handle(parent)?;
        *out = to_c(catalog.define_container(parent, name)?)?;
        Ok(())
    })
}

/// Looks up the first live child of `parent` named `name`.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `name` must reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_cont_id(
    catalog: *const AggCatalog,
    parent: c_int,
    name: *const c_char,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let name = unsafe { c_str(name) }?;
        let out = unsafe { out_ref(out_id) }?;
        let parent: ContainerId = handle(parent)?;
        *out = to_c(catalog.inquire_container_id(parent, name)?)?;
        Ok(())
    })
}

/// Writes the number of children registered under `parent`.
///
/// # Safety
/// `catalog` and `out_count` must be valid pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_nconts(
    catalog: *const AggCatalog,
    parent: c_int,
    out_count: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let out = unsafe { out_ref(out_count) }?;
        let parent: ContainerId = handle(parent)?;
        *out = count_to_c(catalog.inquire_child_count(parent)?)?;
        Ok(())
    })
}

/// Copies the child handles of `parent` into `out_ids`.
///
/// # Safety
/// `catalog` must be valid; `out_ids` must point to at least `capacity`
/// writable entries (it may be null when the container has no children).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_cont_ids(
    catalog: *const AggCatalog,
    parent: c_int,
    out_ids: *mut c_int,
    capacity: usize,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let parent: ContainerId = handle(parent)?;
        let children = catalog.container(parent)?.children();
        unsafe { fill(out_ids, capacity, children) }
    })
}

/// Defines a dimension of length `len` in `container`.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `name` must reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_def_dim(
    catalog: *mut AggCatalog,
    container: c_int,
    name: *const c_char,
    len: c_int,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_mut(catalog) }?;
        let name = unsafe { c_str(name) }?;
        let out = unsafe { out_ref(out_id) }?;
        let len = usize::try_from(len).map_err(|_| Status::InvalidArgument)?;
        let container: ContainerId = handle(container)?;
        *out = to_c(catalog.define_dimension(container, name, len)?)?;
        Ok(())
    })
}

/// Looks up the first live dimension of `container` named `name`.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `name` must reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_dim_id(
    catalog: *const AggCatalog,
    container: c_int,
    name: *const c_char,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let name = unsafe { c_str(name) }?;
        let out = unsafe { out_ref(out_id) }?;
        let container: ContainerId = handle(container)?;
        *out = to_c(catalog.inquire_dimension_id(container, name)?)?;
        Ok(())
    })
}

/// Writes the number of dimension slots in `container`.
///
/// # Safety
/// `catalog` and `out_count` must be valid pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_ndims(
    catalog: *const AggCatalog,
    container: c_int,
    out_count: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let out = unsafe { out_ref(out_count) }?;
        let container: ContainerId = handle(container)?;
        *out = count_to_c(catalog.inquire_dimension_count(container)?)?;
        Ok(())
    })
}

/// Writes the length of a live dimension.
///
/// # Safety
/// `catalog` and `out_len` must be valid pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_dim_len(
    catalog: *const AggCatalog,
    container: c_int,
    dimension: c_int,
    out_len: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let out = unsafe { out_ref(out_len) }?;
        let container: ContainerId = handle(container)?;
        let dimension: DimensionId = handle(dimension)?;
        *out = count_to_c(catalog.dimension(container, dimension)?.len())?;
        Ok(())
    })
}

/// Defines a variable over `ndims` dimension handles read from `dim_ids`.
///
/// Negative or out-of-range dimension handles yield the dim-not-found
/// status, and no variable is created.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `name` must reference a
/// null-terminated UTF-8 string; `dim_ids` must point to `ndims` readable
/// entries (it may be null when `ndims` is zero).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_def_var(
    catalog: *mut AggCatalog,
    container: c_int,
    name: *const c_char,
    ndims: c_int,
    dim_ids: *const c_int,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_mut(catalog) }?;
        let name = unsafe { c_str(name) }?;
        let out = unsafe { out_ref(out_id) }?;
        let ndims = usize::try_from(ndims).map_err(|_| Status::InvalidArgument)?;
        let raw: &[c_int] = match ndims {
            0 => &[],
            _ if dim_ids.is_null() => return Err(Status::InvalidArgument),
            n => unsafe { slice::from_raw_parts(dim_ids, n) },
        };
        let container: ContainerId = handle(container)?;
        catalog.container(container)?;
        let dims = raw
            .iter()
            .map(|&d| {
                u32::try_from(d)
                    .map(DimensionId)
                    .map_err(|_| Status::DimNotFound)
            })
            .collect::<Result<Vec<_>, _>>()?;
        *out = to_c(catalog.define_variable(container, name, &dims)?)?;
        Ok(())
    })
}

/// Looks up the first live variable of `container` named `name`.
///
/// # Safety
/// `catalog` and `out_id` must be valid pointers; `name` must reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_var_id(
    catalog: *const AggCatalog,
    container: c_int,
    name: *const c_char,
    out_id: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let name = unsafe { c_str(name) }?;
        let out = unsafe { out_ref(out_id) }?;
        let container: ContainerId = handle(container)?;
        *out = to_c(catalog.inquire_variable_id(container, name)?)?;
        Ok(())
    })
}

/// Writes the number of variable slots in `container`.
///
/// # Safety
/// `catalog` and `out_count` must be valid pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_nvars(
    catalog: *const AggCatalog,
    container: c_int,
    out_count: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let out = unsafe { out_ref(out_count) }?;
        let container: ContainerId = handle(container)?;
        *out = count_to_c(catalog.inquire_variable_count(container)?)?;
        Ok(())
    })
}

/// Writes how many dimensions a live variable spans.
///
/// # Safety
/// `catalog` and `out_count` must be valid pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_var_ndims(
    catalog: *const AggCatalog,
    container: c_int,
    variable: c_int,
    out_count: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let out = unsafe { out_ref(out_count) }?;
        let container: ContainerId = handle(container)?;
        let variable: VariableId = handle(variable)?;
        *out = count_to_c(catalog.variable(container, variable)?.dimensions().len())?;
        Ok(())
    })
}

/// Copies a live variable's dimension handles into `out_ids`.
///
/// # Safety
/// `catalog` must be valid; `out_ids` must point to at least `capacity`
/// writable entries (it may be null for a scalar variable).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_var_dimids(
    catalog: *const AggCatalog,
    container: c_int,
    variable: c_int,
    out_ids: *mut c_int,
    capacity: usize,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let container: ContainerId = handle(container)?;
        let variable: VariableId = handle(variable)?;
        let dims = catalog.variable(container, variable)?.dimensions();
        unsafe { fill(out_ids, capacity, dims) }
    })
}

/// Sets one field of a variable's fragment-location descriptor; a null
/// `value` unsets it.
///
/// # Safety
/// `catalog` must be valid; `value` must be null or reference a
/// null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_set_fragment_field(
    catalog: *mut AggCatalog,
    container: c_int,
    variable: c_int,
    field: c_int,
    value: *const c_char,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_mut(catalog) }?;
        let field = fragment_field(field)?;
        let value = if value.is_null() {
            None
        } else {
            Some(unsafe { c_str(value) }?.to_owned())
        };
        let container: ContainerId = handle(container)?;
        let variable: VariableId = handle(variable)?;
        catalog
            .fragment_mut(container, variable)?
            .set_field(field, value);
        Ok(())
    })
}

/// Copies one field of a variable's fragment-location descriptor into
/// `out_buf` as a null-terminated string.
///
/// `out_len` receives the field's byte length without the terminator, or
/// `-1` when the field is unset (nothing is written to `out_buf` then). A
/// buffer too small for the value and its terminator is an invalid argument;
/// `out_len` still reports the needed length.
///
/// # Safety
/// `catalog` and `out_len` must be valid; `out_buf` must point to at least
/// `capacity` writable bytes (it may be null when `capacity` is zero).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_inq_fragment_field(
    catalog: *const AggCatalog,
    container: c_int,
    variable: c_int,
    field: c_int,
    out_buf: *mut c_char,
    capacity: usize,
    out_len: *mut c_int,
) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_ref(catalog) }?;
        let out_len = unsafe { out_ref(out_len) }?;
        let field = fragment_field(field)?;
        let container: ContainerId = handle(container)?;
        let variable: VariableId = handle(variable)?;
        let Some(value) = catalog.variable(container, variable)?.fragment().field(field) else {
            *out_len = -1;
            return Ok(());
        };
        *out_len = count_to_c(value.len())?;
        if value.len() >= capacity || out_buf.is_null() {
            return Err(Status::InvalidArgument);
        }
        let buffer = unsafe { slice::from_raw_parts_mut(out_buf.cast::<u8>(), value.len() + 1) };
        buffer[..value.len()].copy_from_slice(value.as_bytes());
        buffer[value.len()] = 0;
        Ok(())
    })
}

/// Tears down `container` and its whole subtree.
///
/// # Safety
/// `catalog` must be a valid pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn agg_free_cont(catalog: *mut AggCatalog, container: c_int) -> c_int {
    guard(|| {
        let catalog = unsafe { catalog_mut(catalog) }?;
        let container: ContainerId = handle(container)?;
        catalog.free_container(container)?;
        Ok(())
    })
}
