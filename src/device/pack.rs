use packed_struct::{prelude::*, types::bits::Bits};

use crate::color::Color;

pub const FRAME_LEN: usize = 7;

pub type CommandFrame = [u8; FRAME_LEN];

const SET_COLOR_OPCODE: u8 = 0x56;
const RGB_MODE: u8 = 0xF0;
const TERMINATOR: u8 = 0xAA;

// Set Static Color (7 bytes):
// Byte # | Definition
// 0      | 0x56 = Opcode
// 1      | Red
// 2      | Green
// 3      | Blue
// 4      | 0x00 = White level, unused while in RGB mode
// 5      | 0xF0 = RGB mode
// 6      | 0xAA = Terminator
#[derive(PackedStruct, Debug, PartialEq, Clone)]
#[packed_struct(bit_numbering = "msb0")]
pub struct SetColorPack {
    #[packed_field(bits = "0..=7")]
    pub opcode: Integer<u8, Bits<8>>,
    #[packed_field(bits = "8..=15")]
    pub red: Integer<u8, Bits<8>>,
    #[packed_field(bits = "16..=23")]
    pub green: Integer<u8, Bits<8>>,
    #[packed_field(bits = "24..=31")]
    pub blue: Integer<u8, Bits<8>>,
    #[packed_field(bits = "32..=39")]
    pub _white: ReservedZero<packed_bits::Bits<8>>,
    #[packed_field(bits = "40..=47")]
    pub mode: Integer<u8, Bits<8>>,
    #[packed_field(bits = "48..=55")]
    pub terminator: Integer<u8, Bits<8>>,
}

impl From<Color> for SetColorPack {
    fn from(color: Color) -> Self {
        Self {
            opcode: SET_COLOR_OPCODE.into(),
            red: color.red.into(),
            green: color.green.into(),
            blue: color.blue.into(),
            _white: Default::default(),
            mode: RGB_MODE.into(),
            terminator: TERMINATOR.into(),
        }
    }
}

/// Encode `color` as the strip's "set static color" command.
pub fn encode(color: Color) -> Result<CommandFrame, PackingError> {
    SetColorPack::from(color).pack()
}

/// Space separated hex, for logging frames.
pub fn hex(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
