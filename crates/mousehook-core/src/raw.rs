//! Read-only view over the record the OS passes to a low-level mouse hook.
//!
//! The layout mirrors `MSLLHOOKSTRUCT`. The record belongs to the OS and is
//! only valid for the duration of one hook call, so the view borrows it and
//! cannot outlive that call.

// FFI type names match Win32 API conventions
#![allow(clippy::upper_case_acronyms)]

/// Hook stage and message codes used by the decoder.
pub mod codes {
    /// The only stage a `WH_MOUSE_LL` hook should process.
    pub const HC_ACTION: i32 = 0;

    pub const WM_MOUSEMOVE: u32 = 0x0200;
    pub const WM_LBUTTONDOWN: u32 = 0x0201;
    pub const WM_LBUTTONUP: u32 = 0x0202;
    pub const WM_RBUTTONDOWN: u32 = 0x0204;
    pub const WM_RBUTTONUP: u32 = 0x0205;
    pub const WM_MBUTTONDOWN: u32 = 0x0207;
    pub const WM_MBUTTONUP: u32 = 0x0208;
    pub const WM_MOUSEWHEEL: u32 = 0x020A;
    pub const WM_XBUTTONDOWN: u32 = 0x020B;
    pub const WM_XBUTTONUP: u32 = 0x020C;
    pub const WM_MOUSEHWHEEL: u32 = 0x020E;

    pub const XBUTTON1: u16 = 0x0001;
    pub const XBUTTON2: u16 = 0x0002;

    /// `flags` bit set when the event was synthesized (e.g. `SendInput`).
    pub const LLMHF_INJECTED: u32 = 0x0000_0001;
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct POINT {
    pub x: i32,
    pub y: i32,
}

/// Memory layout of `MSLLHOOKSTRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseHookRecord {
    pub pt: POINT,
    /// Packed data word: wheel delta or extended button in the high 16 bits.
    pub mouse_data: u32,
    pub flags: u32,
    /// Message time in milliseconds since system start.
    pub time: u32,
    pub extra_info: usize,
}

impl MouseHookRecord {
    /// Record with the given position and packed data word, everything else zero.
    pub fn new(x: i32, y: i32, mouse_data: u32) -> Self {
        Self {
            pt: POINT { x, y },
            mouse_data,
            ..Self::default()
        }
    }
}

/// Borrowed view over one [`MouseHookRecord`].
#[derive(Debug, Clone, Copy)]
pub struct RawMouseRecord<'a> {
    record: &'a MouseHookRecord,
}

impl<'a> RawMouseRecord<'a> {
    pub fn new(record: &'a MouseHookRecord) -> Self {
        Self { record }
    }

    /// Build a view from the `lParam` of a `WH_MOUSE_LL` hook call.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// A non-null `lparam` must point to a valid `MSLLHOOKSTRUCT` that stays
    /// alive and unmodified for `'a`. Inside the hook procedure this holds for
    /// the duration of the call.
    pub unsafe fn from_lparam(lparam: isize) -> Option<Self> {
        let ptr = lparam as *const MouseHookRecord;
        // SAFETY: upheld by the caller; `as_ref` rejects null.
        unsafe { ptr.as_ref() }.map(Self::new)
    }

    pub fn x(&self) -> i32 {
        self.record.pt.x
    }

    pub fn y(&self) -> i32 {
        self.record.pt.y
    }

    pub fn mouse_data(&self) -> u32 {
        self.record.mouse_data
    }

    /// High-order 16 bits of the packed data word.
    pub fn high_word(&self) -> u16 {
        (self.record.mouse_data >> 16) as u16
    }

    /// Signed wheel rotation carried in the high word.
    pub fn wheel_delta(&self) -> i16 {
        self.high_word() as i16
    }

    pub fn flags(&self) -> u32 {
        self.record.flags
    }

    pub fn is_injected(&self) -> bool {
        self.record.flags & codes::LLMHF_INJECTED != 0
    }

    pub fn timestamp_ms(&self) -> u32 {
        self.record.time
    }
}
