use dotenv::dotenv;
use lcd1602_i2c::lcd::hd44780::driver::{HD44780Driver, I2cHD44780Driver};
use lcd1602_i2c::raw::RawI2cBus;
use log::{debug, info};
use std::env::var;
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    let hostname = System::host_name().unwrap_or_else(|| UNKNOWN_STR.to_string());

    info!(
        "Hello, {}!",
        System::name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!("Hostname {hostname}");

    // Bus index and address override from env
    let bus_index: u8 = var("LCD1602_I2C_BUS")
        .ok()
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(1);
    let requested = var("LCD1602_I2C_ADDR")
        .ok()
        .map(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16))
        .transpose()?;

    debug!("Opening I2C bus {bus_index}...");
    let mut bus = RawI2cBus::new(bus_index)?;
    debug!("{bus:?} opened.");

    let mut lcd = I2cHD44780Driver::new_resolved(&mut bus, requested)?;
    info!("LCD found at 0x{:02X}", lcd.address());

    lcd.init(true, false)?;

    lcd.message("Hello World!")?;
    sleep(Duration::from_secs(2));

    lcd.clear_display()?;
    lcd.message(&format!("I am\n{hostname}"))?;
    sleep(Duration::from_secs(2));

    lcd.clear_display()?;
    lcd.write_at(4, 0, "16x2 LCD")?;
    lcd.write_at(2, 1, "over I2C")?;

    for _ in 0..3 {
        sleep(Duration::from_millis(500));
        lcd.set_backlight(false)?;
        sleep(Duration::from_millis(500));
        lcd.set_backlight(true)?;
    }

    Ok(())
}
