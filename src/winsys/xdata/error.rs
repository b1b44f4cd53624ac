use x11rb::protocol::xproto;
use x11rb::protocol::ErrorKind;
use x11rb::x11_utils::X11Error;

/// Errors that stem from racing the server, e.g. requests against a
/// window that was destroyed before its event reached us. These are
/// expected during normal operation and carry no information.
pub fn is_benign(
    kind: ErrorKind,
    major_opcode: u8,
) -> bool {
    match kind {
        ErrorKind::Window => true,
        ErrorKind::Match => {
            major_opcode == xproto::SET_INPUT_FOCUS_REQUEST
                || major_opcode == xproto::CONFIGURE_WINDOW_REQUEST
        },
        ErrorKind::Drawable => {
            major_opcode == xproto::POLY_TEXT8_REQUEST
                || major_opcode == xproto::POLY_FILL_RECTANGLE_REQUEST
                || major_opcode == xproto::POLY_SEGMENT_REQUEST
                || major_opcode == xproto::COPY_AREA_REQUEST
        },
        ErrorKind::Access => {
            major_opcode == xproto::GRAB_BUTTON_REQUEST || major_opcode == xproto::GRAB_KEY_REQUEST
        },
        _ => false,
    }
}

#[inline]
pub fn is_benign_error(error: &X11Error) -> bool {
    is_benign(error.error_kind, error.major_opcode)
}
