//! Stamps a compile-time default worker count into the environment, the way the
//! teacher's `build.rs` stamps `THREAD_COUNT` for its own `-j/--threads` default.
//! chuid's default is the literal fixed value spec.md §6 specifies (`-t` defaults
//! to 20), independent of the machine's available parallelism.

fn main() {
    const SPEC_DEFAULT: usize = 20;

    println!("cargo:rustc-env=CHUID_THREAD_COUNT={SPEC_DEFAULT}");
}
