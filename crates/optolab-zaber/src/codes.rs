use std::fmt;

use serde::Serialize;

/// Error codes a device reports in the data field of an error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i32")]
pub enum DeviceErrorCode {
    CannotHome,
    DeviceNumberInvalid,
    VoltageLow,
    VoltageHigh,
    StoredPositionInvalid,
    AbsolutePositionInvalid,
    RelativePositionInvalid,
    VelocityInvalid,
    PeripheralIdInvalid,
    ResolutionInvalid,
    RunCurrentInvalid,
    HoldCurrentInvalid,
    ModeInvalid,
    HomeSpeedInvalid,
    SpeedInvalid,
    AccelerationInvalid,
    MaximumRangeInvalid,
    CurrentPositionInvalid,
    MaximumRelativeMoveInvalid,
    OffsetInvalid,
    AliasInvalid,
    LockStateInvalid,
    SettingInvalid,
    CommandInvalid,
    Busy,
    SavePositionInvalid,
    SavePositionNotHomed,
    ReturnPositionInvalid,
    MovePositionInvalid,
    MovePositionNotHomed,
    RelativePositionLimited,
    SettingsLocked,
    DisableAutoHomeInvalid,
    Bit10Invalid,
    HomeSwitchInvalid,
    Bit13Invalid,
}

use DeviceErrorCode::*;

const TABLE: &[(i32, DeviceErrorCode, &str)] = &[
    (1, CannotHome, "cannot home"),
    (2, DeviceNumberInvalid, "device number invalid"),
    (14, VoltageLow, "supply voltage low"),
    (15, VoltageHigh, "supply voltage high"),
    (18, StoredPositionInvalid, "stored position invalid"),
    (20, AbsolutePositionInvalid, "absolute position invalid"),
    (21, RelativePositionInvalid, "relative position invalid"),
    (22, VelocityInvalid, "velocity invalid"),
    (36, PeripheralIdInvalid, "peripheral id invalid"),
    (37, ResolutionInvalid, "resolution invalid"),
    (38, RunCurrentInvalid, "run current invalid"),
    (39, HoldCurrentInvalid, "hold current invalid"),
    (40, ModeInvalid, "mode invalid"),
    (41, HomeSpeedInvalid, "home speed invalid"),
    (42, SpeedInvalid, "speed invalid"),
    (43, AccelerationInvalid, "acceleration invalid"),
    (44, MaximumRangeInvalid, "maximum range invalid"),
    (45, CurrentPositionInvalid, "current position invalid"),
    (46, MaximumRelativeMoveInvalid, "maximum relative move invalid"),
    (47, OffsetInvalid, "offset invalid"),
    (48, AliasInvalid, "alias invalid"),
    (49, LockStateInvalid, "lock state invalid"),
    (53, SettingInvalid, "setting invalid"),
    (64, CommandInvalid, "command invalid"),
    (255, Busy, "busy"),
    (1600, SavePositionInvalid, "save position invalid"),
    (1601, SavePositionNotHomed, "save position not homed"),
    (1700, ReturnPositionInvalid, "return position invalid"),
    (1800, MovePositionInvalid, "move position invalid"),
    (1801, MovePositionNotHomed, "move position not homed"),
    (2146, RelativePositionLimited, "relative position limited"),
    (3600, SettingsLocked, "settings locked"),
    (4008, DisableAutoHomeInvalid, "disable auto home invalid"),
    (4010, Bit10Invalid, "bit 10 invalid"),
    (4012, HomeSwitchInvalid, "home switch invalid"),
    (4013, Bit13Invalid, "bit 13 invalid"),
];

impl DeviceErrorCode {
    /// Look up a numeric code. Returns `None` for codes outside the known set.
    pub fn from_code(code: i32) -> Option<Self> {
        TABLE
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, kind, _)| *kind)
    }

    /// The numeric code as sent on the wire.
    pub fn code(self) -> i32 {
        self.entry().0
    }

    /// Fixed human-readable description.
    pub fn message(self) -> &'static str {
        self.entry().2
    }

    /// Every known code, in ascending numeric order.
    pub fn all() -> impl Iterator<Item = DeviceErrorCode> {
        TABLE.iter().map(|(_, kind, _)| *kind)
    }

    // TABLE rows are in variant declaration order.
    fn entry(self) -> &'static (i32, DeviceErrorCode, &'static str) {
        &TABLE[self as usize]
    }
}

impl From<DeviceErrorCode> for i32 {
    fn from(value: DeviceErrorCode) -> Self {
        value.code()
    }
}

impl fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn known_codes_map_both_ways() {
        for kind in DeviceErrorCode::all() {
            assert_eq!(DeviceErrorCode::from_code(kind.code()), Some(kind));
        }
        assert_eq!(DeviceErrorCode::all().count(), 36);
    }

    #[test]
    fn table_order_matches_variants() {
        for (index, row) in TABLE.iter().enumerate() {
            assert_eq!(row.1 as usize, index);
        }
    }

    #[test]
    fn table_rows_are_unique() {
        let codes: HashSet<i32> = TABLE.iter().map(|row| row.0).collect();
        let kinds: HashSet<DeviceErrorCode> = TABLE.iter().map(|row| row.1).collect();
        assert_eq!(codes.len(), TABLE.len());
        assert_eq!(kinds.len(), TABLE.len());
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(DeviceErrorCode::from_code(0), None);
        assert_eq!(DeviceErrorCode::from_code(19), None);
        assert_eq!(DeviceErrorCode::from_code(-1), None);
    }

    #[test]
    fn messages_read_naturally() {
        assert_eq!(CannotHome.message(), "cannot home");
        assert_eq!(Busy.code(), 255);
        assert_eq!(
            AbsolutePositionInvalid.to_string(),
            "absolute position invalid (code 20)"
        );
    }
}
