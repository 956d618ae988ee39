//! Command codes.
//!
//! Replies echo the command code of the request they answer, except for
//! [`ERROR`], which replaces it when the device rejects a command.

/// Restart the device. No reply.
pub const RESET: u8 = 0;

/// Move to the home sensor and zero the position counter.
pub const HOME: u8 = 1;

/// Re-assign device numbers along the chain.
pub const RENUMBER: u8 = 2;

/// Save the current position into a slot (0-15).
pub const STORE_CURRENT_POSITION: u8 = 16;

/// Report the position saved in a slot.
pub const RETURN_STORED_POSITION: u8 = 17;

/// Move to the position saved in a slot.
pub const MOVE_TO_STORED_POSITION: u8 = 18;

/// Move to an absolute position in microsteps.
pub const MOVE_ABSOLUTE: u8 = 20;

/// Move by a signed distance in microsteps.
pub const MOVE_RELATIVE: u8 = 21;

/// Report the current activity code.
pub const RETURN_STATUS: u8 = 54;

/// Report the current position in microsteps.
pub const RETURN_CURRENT_POSITION: u8 = 60;

/// Reply-only code: the data field carries an error code.
pub const ERROR: u8 = 255;

/// Highest stored-position slot index.
pub const MAX_STORED_SLOT: i32 = 15;

/// Returns a human-readable name for a command code.
pub fn command_name(code: u8) -> &'static str {
    match code {
        RESET => "reset",
        HOME => "home",
        RENUMBER => "renumber",
        STORE_CURRENT_POSITION => "store_current_position",
        RETURN_STORED_POSITION => "return_stored_position",
        MOVE_TO_STORED_POSITION => "move_to_stored_position",
        MOVE_ABSOLUTE => "move_absolute",
        MOVE_RELATIVE => "move_relative",
        RETURN_STATUS => "return_status",
        RETURN_CURRENT_POSITION => "return_current_position",
        ERROR => "error",
        _ => "unknown",
    }
}

/// Returns true for commands the device answers with a reply frame.
pub fn expects_reply(code: u8) -> bool {
    code != RESET
}
