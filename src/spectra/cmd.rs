/// Command codes understood by the Spectra COG driver.
pub struct Cmd;
impl Cmd {
    // Init
    pub const PANEL_SETTINGS: u8 = 0x00;
    /// Same opcode as `PANEL_SETTINGS`, sent with the soft-reset payload.
    pub const SOFT_RESET: u8 = 0x00;
    pub const INPUT_TEMPERATURE: u8 = 0xE5;
    pub const ACTIVE_TEMPERATURE: u8 = 0xE0;

    // Power
    pub const DCDC_POWER_ON: u8 = 0x04;
    pub const DCDC_POWER_OFF: u8 = 0x02;

    // Update
    pub const WRITE_RAM_PRIMARY: u8 = 0x10;
    pub const WRITE_RAM_SECONDARY: u8 = 0x13;
    pub const DISPLAY_REFRESH: u8 = 0x12;
}

/*
Start sequence for the small (up to 4.2") panels:
0x00 0x0E      - Soft reset of the COG driver
0xE5 0x19      - Input temperature (25C)
0xE0 0x02      - Active temperature
0x00 0xCF 0x89 - Panel settings
0x04 0x00      - DC/DC on

Stop sequence:
0x02 0x00      - DC/DC off
*/
