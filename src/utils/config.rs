//! Configuration and constants for the parser and CLI.

/// Magic bytes at offset 0 of every simpleperf trace file
pub const TRACE_MAGIC: &[u8] = b"SIMPLEPERF";

/// The only record-stream version this parser understands
pub const TRACE_VERSION: u16 = 1;

/// Nanoseconds per microsecond (sample clock -> reporting unit)
pub const NS_PER_US: i64 = 1_000;

/// Current summary report schema version
pub const SUMMARY_SCHEMA_VERSION: &str = "1.0.0";

// File suffixes owned by the managed runtime. Symbols resolved from these
// files are Java methods, everything else is native code.
pub const JVM_MANAGED_SUFFIXES: &[&str] =
    &[".dex", ".odex", ".oat", ".vdex", ".art", ".jar", ".apk"];

/// Pseudo-file the recording agent uses for kallsyms-resolved kernel symbols
pub const KERNEL_SYMBOL_FILE: &str = "[kernel.kallsyms]";

// Kernel symbol prefixes marking a syscall entry point.
pub const KERNEL_SYSCALL_PREFIXES: &[&str] =
    &["sys_", "__x64_sys_", "__arm64_sys_", "__ia32_sys_", "compat_sys_"];

// Bionic libc syscall wrapper symbols. Pthread trampolines and ordinary
// string/memory routines must not match.
pub const LIBC_SYSCALL_WRAPPERS: &[&str] = &[
    "__ioctl",
    "__openat",
    "__close",
    "__read",
    "__write",
    "__pread64",
    "__pwrite64",
    "__mmap",
    "__munmap",
    "__futex_wait",
    "__futex_wake",
    "__epoll_pwait",
    "__ppoll",
    "__recvfrom",
    "__sendto",
    "__rt_sigtimedwait",
    "__nanosleep",
    "syscall",
];
