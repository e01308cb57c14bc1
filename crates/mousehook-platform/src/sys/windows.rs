//! Windows native implementation of the low-level mouse hook.
//!
//! The OS calls the hook procedure on the thread that installed the hook,
//! from inside that thread's `GetMessageW`. The dispatcher is therefore kept
//! in thread-local storage on the installing thread.

use crate::error::{HookError, HookResult};
use mousehook_core::{codes, Dispatcher, MouseHookRecord, RawMouseRecord};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use windows_sys::Win32::Foundation::{GetLastError, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PeekMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HHOOK, MSG, MSLLHOOKSTRUCT, PM_NOREMOVE, PM_REMOVE, WH_MOUSE_LL, WM_QUIT, WM_USER,
};

const _: () = assert!(
    std::mem::size_of::<MSLLHOOKSTRUCT>() == std::mem::size_of::<MouseHookRecord>()
);

// One hook per process
static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static DISPATCHER: RefCell<Option<Dispatcher>> = const { RefCell::new(None) };
}

/// Install `WH_MOUSE_LL` with `dispatcher` handling every event on this thread.
pub fn install(dispatcher: Dispatcher) -> HookResult<isize> {
    if INSTALLED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(HookError::AlreadyInstalled);
    }

    // Must be in place before the OS can call the hook procedure.
    DISPATCHER.with(|slot| *slot.borrow_mut() = Some(dispatcher));

    let hook = unsafe {
        SetWindowsHookExW(
            WH_MOUSE_LL,
            Some(mouse_hook_proc),
            GetModuleHandleW(std::ptr::null()),
            0,
        )
    };
    if hook.is_null() {
        let code = unsafe { GetLastError() };
        DISPATCHER.with(|slot| *slot.borrow_mut() = None);
        INSTALLED.store(false, Ordering::SeqCst);
        return Err(HookError::InstallFailed { code });
    }

    debug!("WH_MOUSE_LL installed (handle: {:?})", hook);
    Ok(hook as isize)
}

/// Remove a hook returned by [`install`]. The error is the OS error code.
///
/// On failure the registration may still be live, so the dispatcher stays in
/// place and the process keeps counting as hooked.
pub fn uninstall(hook: isize) -> Result<(), u32> {
    if unsafe { UnhookWindowsHookEx(hook as HHOOK) } == 0 {
        return Err(unsafe { GetLastError() });
    }

    DISPATCHER.with(|slot| *slot.borrow_mut() = None);
    INSTALLED.store(false, Ordering::SeqCst);
    Ok(())
}

/// Force creation of this thread's message queue so `PostThreadMessageW`
/// from other threads cannot be lost.
pub fn ensure_message_queue() {
    let mut msg: MSG = unsafe { std::mem::zeroed() };
    unsafe { PeekMessageW(&mut msg, std::ptr::null_mut(), WM_USER, WM_USER, PM_NOREMOVE) };
}

/// Retrieve and discard messages until `WM_QUIT` or a fatal error.
pub fn pump() -> HookResult<()> {
    let mut msg: MSG = unsafe { std::mem::zeroed() };
    loop {
        let ret = unsafe { GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) };
        match ret {
            -1 => {
                let code = unsafe { GetLastError() };
                return Err(HookError::PumpFailed { code });
            }
            0 => return Ok(()),
            _ => {}
        }
    }
}

pub fn current_thread_id() -> u32 {
    unsafe { GetCurrentThreadId() }
}

/// Remove every `WM_QUIT` still queued for this thread.
pub fn discard_quit() {
    let mut msg: MSG = unsafe { std::mem::zeroed() };
    while unsafe { PeekMessageW(&mut msg, std::ptr::null_mut(), WM_QUIT, WM_QUIT, PM_REMOVE) } != 0 {}
}

/// Post `WM_QUIT` to a pumping thread.
pub fn post_quit(thread_id: u32) -> bool {
    unsafe { PostThreadMessageW(thread_id, WM_QUIT, 0, 0) != 0 }
}

/// Low-level mouse hook procedure.
unsafe extern "system" fn mouse_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let forward = || unsafe { CallNextHookEx(std::ptr::null_mut(), code, wparam, lparam) };

    // Clone out so no borrow is held while listeners run (they may pump messages).
    let dispatcher = DISPATCHER
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten();

    match dispatcher {
        Some(dispatcher) => {
            let record = if code == codes::HC_ACTION {
                // SAFETY: at HC_ACTION lParam points to an MSLLHOOKSTRUCT valid for this call.
                unsafe { RawMouseRecord::from_lparam(lparam) }
            } else {
                None
            };
            dispatcher.handle(code, wparam as u32, record, forward)
        }
        None => forward(),
    }
}
