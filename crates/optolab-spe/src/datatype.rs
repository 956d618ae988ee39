use std::fmt;

use serde::Serialize;

/// Sample type of the pixel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Float32,
    Int32,
    Int16,
    UInt16,
}

impl Datatype {
    /// Map the on-disk datatype code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Datatype::Float32),
            1 => Some(Datatype::Int32),
            2 => Some(Datatype::Int16),
            3 => Some(Datatype::UInt16),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Datatype::Float32 => 0,
            Datatype::Int32 => 1,
            Datatype::Int16 => 2,
            Datatype::UInt16 => 3,
        }
    }

    /// Bytes per sample.
    pub fn size(self) -> usize {
        match self {
            Datatype::Float32 | Datatype::Int32 => 4,
            Datatype::Int16 | Datatype::UInt16 => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Datatype::Float32 => "float32",
            Datatype::Int32 => "int32",
            Datatype::Int16 => "int16",
            Datatype::UInt16 => "uint16",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_both_ways() {
        for code in 0..4 {
            let datatype = Datatype::from_code(code).unwrap();
            assert_eq!(datatype.code(), code);
        }
        assert_eq!(Datatype::from_code(4), None);
        assert_eq!(Datatype::from_code(u16::MAX), None);
    }

    #[test]
    fn sizes() {
        assert_eq!(Datatype::Float32.size(), 4);
        assert_eq!(Datatype::Int32.size(), 4);
        assert_eq!(Datatype::Int16.size(), 2);
        assert_eq!(Datatype::UInt16.size(), 2);
        assert_eq!(Datatype::UInt16.to_string(), "uint16");
    }
}
