//! C FFI bindings
//!
//! Status codes: `0` success, `-1` null pointer or rejected profile,
//! `-2` scratch allocation failure.

use crate::{DIGEST_LEN, Error, NeoScrypt, PASSWORD_LEN, Profile};
use core::slice;

const OK: i32 = 0;
const BAD_ARGUMENT: i32 = -1;
const OUT_OF_MEMORY: i32 = -2;

fn status(err: Error) -> i32 {
    match err {
        Error::Allocation { .. } => OUT_OF_MEMORY,
        _ => BAD_ARGUMENT,
    }
}

/// Opaque hasher handle for FFI
pub struct NeoHasher {
    inner: NeoScrypt,
}

/// Create a hasher for `profile`
/// Returns null if the profile is rejected (caller must free with neoscrypt_free)
#[unsafe(no_mangle)]
pub extern "C" fn neoscrypt_new(profile: u32) -> *mut NeoHasher {
    match NeoScrypt::new(Profile(profile)) {
        Ok(inner) => Box::into_raw(Box::new(NeoHasher { inner })),
        Err(_) => core::ptr::null_mut(),
    }
}

/// Free a hasher instance
///
/// # Safety
///
/// `hasher` must be null or a pointer returned by `neoscrypt_new` that has
/// not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn neoscrypt_free(hasher: *mut NeoHasher) {
    if !hasher.is_null() {
        unsafe {
            let _ = Box::from_raw(hasher);
        }
    }
}

/// Hash with a handle from neoscrypt_new()
/// - password: pointer to 80 bytes
/// - output: pointer to 32-byte buffer for result
///
/// # Safety
///
/// `hasher` must be null or a live handle from `neoscrypt_new`. Non-null
/// `password` must be readable for 80 bytes and non-null `output` writable
/// for 32 bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn neoscrypt_hasher_hash(
    hasher: *const NeoHasher,
    password: *const u8,
    output: *mut u8,
) -> i32 {
    if hasher.is_null() {
        return BAD_ARGUMENT;
    }
    let hasher = unsafe { &*hasher };
    unsafe { hash_into(&hasher.inner, password, output) }
}

/// One-shot hash: decode `profile`, hash 80 bytes of `password` into 32 bytes of `output`
///
/// # Safety
///
/// Same pointer requirements as `neoscrypt_hasher_hash`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn neoscrypt_hash(
    password: *const u8,
    output: *mut u8,
    profile: u32,
) -> i32 {
    match NeoScrypt::new(Profile(profile)) {
        Ok(hasher) => unsafe { hash_into(&hasher, password, output) },
        Err(err) => status(err),
    }
}

unsafe fn hash_into(hasher: &NeoScrypt, password: *const u8, output: *mut u8) -> i32 {
    if password.is_null() || output.is_null() {
        return BAD_ARGUMENT;
    }

    let mut header = [0u8; PASSWORD_LEN];
    unsafe {
        header.copy_from_slice(slice::from_raw_parts(password, PASSWORD_LEN));
    }

    match hasher.hash(&header) {
        Ok(digest) => {
            unsafe {
                slice::from_raw_parts_mut(output, DIGEST_LEN).copy_from_slice(&digest);
            }
            OK
        }
        Err(err) => status(err),
    }
}

/// Benchmark: compute N hashes and return total microseconds
/// Returns 0 if the profile is rejected or scratch cannot be allocated
#[unsafe(no_mangle)]
pub extern "C" fn neoscrypt_benchmark(iterations: u32, profile: u32) -> u64 {
    use std::time::Instant;

    let Ok(hasher) = NeoScrypt::new(Profile(profile)) else {
        return 0;
    };
    let mut header = [0u8; PASSWORD_LEN];

    let start = Instant::now();
    for i in 0..iterations {
        header[76..].copy_from_slice(&i.to_le_bytes());
        if hasher.hash(&header).is_err() {
            return 0;
        }
    }
    let elapsed = start.elapsed();

    elapsed.as_micros() as u64
}

/// Get hash rate (hashes per second) from a benchmark run
#[unsafe(no_mangle)]
pub extern "C" fn neoscrypt_hashrate(iterations: u32, microseconds: u64) -> f64 {
    if microseconds == 0 {
        return 0.0;
    }
    (iterations as f64) / (microseconds as f64 / 1_000_000.0)
}
