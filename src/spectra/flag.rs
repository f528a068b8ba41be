/// Payload bytes sent along with the Spectra commands.
///
/// Values are the fixed operating point of the small-format panels; there is no
/// runtime temperature sensing in this driver.
pub struct Flag;
impl Flag {
    /// Soft reset (0x00) payload
    pub const SOFT_RESET: u8 = 0x0E;

    /// Input temperature (0xE5): degrees Celsius
    pub const INPUT_TEMPERATURE_25C: u8 = 0x19;

    /// Active temperature (0xE0)
    pub const ACTIVE_TEMPERATURE: u8 = 0x02;

    /// Panel settings (0x00)
    pub const PANEL_SETTINGS: [u8; 2] = [0xCF, 0x89];

    // DC/DC power on (0x04) and off (0x02)
    pub const DCDC_POWER_ON: u8 = 0x00;
    pub const DCDC_POWER_OFF: u8 = 0x00;
}
