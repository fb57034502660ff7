//! AMG8833 register map and command values

// Control registers
pub const REG_POWER_CONTROL: u8 = 0x00; // PCTL
pub const REG_RESET: u8 = 0x01; // RST
pub const REG_FRAME_RATE: u8 = 0x02; // FPSC
pub const REG_INTERRUPT_CONTROL: u8 = 0x03; // INTC
pub const REG_STATUS: u8 = 0x04; // STAT (read-only)
pub const REG_STATUS_CLEAR: u8 = 0x05; // SCLR
pub const REG_AVERAGE: u8 = 0x07; // AVE
pub const REG_AVERAGE_UNLOCK: u8 = 0x1F; // Undocumented moving-average access register

// Thermistor output (12-bit sign-magnitude, 0.0625 °C/LSB)
pub const REG_THERMISTOR_LOW: u8 = 0x0E; // TTHL
pub const REG_THERMISTOR_HIGH: u8 = 0x0F; // TTHH

// Pixel output (64 × 16-bit little-endian, 0.25 °C/LSB), read in four blocks
pub const REG_PIXEL_BLOCKS: [u8; 4] = [0x80, 0xA0, 0xC0, 0xE0];
pub const PIXEL_BLOCK_LEN: usize = 32;

// Register values
pub const POWER_NORMAL: u8 = 0x00;
pub const RESET_INITIAL: u8 = 0x3F; // Reset flags and reload adjustment values
pub const RESET_FLAG: u8 = 0x30; // Clear status/interrupt flags only
pub const INTERRUPT_ABSOLUTE_ENABLED: u8 = 0x03; // INTEN | INTMOD absolute
pub const STATUS_CLEAR_ALL: u8 = 0x06; // OVS_CLR | INTCLR
pub const AVERAGE_UNLOCK_SEQUENCE: [u8; 3] = [0x50, 0x45, 0x57];
pub const AVERAGE_LOCK: u8 = 0x00;
pub const AVERAGE_MOVING_ON: u8 = 0x20; // MAMOD
pub const AVERAGE_MOVING_OFF: u8 = 0x00;

// Frame rate register values
pub const FPS_10: u8 = 0x00;
pub const FPS_1: u8 = 0x01;

// Geometry
pub const WIDTH: usize = 8;
pub const HEIGHT: usize = 8;
pub const PIXEL_COUNT: usize = WIDTH * HEIGHT;
pub const PIXEL_BYTES: usize = PIXEL_COUNT * 2;
