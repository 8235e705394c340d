//! Subcommand bodies. Each returns the report printed on success.

use anyhow::{Context, Result};
use bone_hw::{Bone, PinMode, PWM_TEMPLATE};
use colored::Colorize;
use platform::{Direction, DutyRatio, FrequencyHz, PinState, Sysfs};

/// Parse pad configuration given as decimal or `0x` hex.
pub fn parse_pin_data(raw: &str) -> Result<u32, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|err| format!("invalid pin data '{raw}': {err}"))
}

fn level(state: PinState) -> &'static str {
    match state {
        PinState::High => "high",
        PinState::Low => "low",
    }
}

pub fn mode<S: Sysfs + Clone>(bone: &Bone<S>, pin: &str, data: u32, template: &str) -> Result<String> {
    let mode = bone
        .set_pin_mode(pin, data, template)
        .with_context(|| format!("Failed to set mode of {pin}"))?;
    Ok(match mode {
        PinMode::Gpio { value_file } => format!(
            "{} {pin} → gpio ({})",
            "✓".green(),
            value_file.display()
        ),
        PinMode::Pwm { channel, path } => format!(
            "{} {pin} → pwm {channel} ({})",
            "✓".green(),
            path.display()
        ),
    })
}

pub fn pwm<S: Sysfs + Clone>(
    bone: &Bone<S>,
    pin: &str,
    freq: f64,
    duty: f64,
    data: u32,
    attach: bool,
) -> Result<String> {
    let freq = FrequencyHz::new(freq).context("Invalid frequency")?;
    let prepared = if attach {
        bone.attach_pwm(pin)
    } else {
        bone.set_pin_mode(pin, data, PWM_TEMPLATE).map(|_| ())
    };
    prepared.with_context(|| format!("Failed to prepare {pin} for PWM"))?;

    let update = bone
        .write_pwm(pin, freq, DutyRatio::new(duty))
        .with_context(|| format!("Failed to update PWM on {pin}"))?;

    let mut report = format!(
        "{} {pin}: period {} ns, duty {} ns",
        "✓".green(),
        update.period.get(),
        update.duty_ns
    );
    if let Some(fallback) = update.fallback {
        report.push_str(&format!(
            "\n{} period {} ns refused ({}), kept {} ns",
            "!".yellow(),
            fallback.requested.get(),
            fallback.reason,
            fallback.applied.get()
        ));
    }
    Ok(report)
}

pub fn pwm_read<S: Sysfs + Clone>(bone: &Bone<S>, pin: &str) -> Result<String> {
    bone.attach_pwm(pin)
        .with_context(|| format!("No PWM channel exported for {pin}"))?;
    let reading = bone
        .read_pwm(pin)?
        .with_context(|| format!("Unable to read PWM state of {pin}"))?;
    Ok(format!(
        "{pin}: {:.3} Hz, duty {:.4}",
        reading.frequency.get(),
        reading.duty_ratio
    ))
}

pub fn gpio_write<S: Sysfs + Clone>(bone: &Bone<S>, pin: &str, state: PinState, export: bool) -> Result<String> {
    let descriptor = bone.pin(pin)?;
    if descriptor.led.is_some() {
        bone.set_led_pin_to_gpio(pin)?;
    } else if export {
        bone.export_gpio(pin, Direction::Out)?;
    }
    bone.digital_write(pin, state)
        .with_context(|| format!("Failed to drive {pin}"))?;
    Ok(format!("{} {pin} = {}", "✓".green(), level(state)))
}

pub fn gpio_read<S: Sysfs + Clone>(bone: &Bone<S>, pin: &str) -> Result<String> {
    let state = bone
        .digital_read(pin)
        .with_context(|| format!("Failed to read {pin}"))?;
    Ok(format!("{pin} = {}", level(state)))
}

pub fn ain<S: Sysfs + Clone>(bone: &Bone<S>, pin: &str) -> Result<String> {
    let value = bone
        .analog_read(pin)
        .with_context(|| format!("Failed to read analog input {pin}"))?;
    Ok(format!("{pin} = {value:.4}"))
}

pub fn mux<S: Sysfs + Clone>(bone: &Bone<S>, pin: &str, json: bool) -> Result<String> {
    let pad = bone.read_pin_mux(pin)?;
    if json {
        return Ok(serde_json::to_string_pretty(&pad)?);
    }
    let Some(pad) = pad else {
        return Ok(format!("{pin}: no mux data (is debugfs mounted?)"));
    };
    Ok(format!(
        "{pin}: 0x{:02x} mode {} pull {} rx {} slew {}",
        pad.raw,
        pad.mux,
        pad.pull.as_str(),
        if pad.receiver { "on" } else { "off" },
        if pad.slow_slew { "slow" } else { "fast" }
    ))
}

pub fn board<S: Sysfs + Clone>(bone: &Bone<S>, json: bool) -> Result<String> {
    let platform = bone.platform().context("Failed to identify board")?;
    if json {
        let eeproms = bone.eeproms()?;
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "platform": platform,
            "eeproms": eeproms,
        }))?);
    }
    let mut report = platform.name.bold().to_string();
    if let Some(version) = &platform.version {
        report.push_str(&format!("\n  revision: {version}"));
    }
    if let Some(serial) = &platform.serial_number {
        report.push_str(&format!("\n  serial:   {serial}"));
    }
    if let Some(dogtag) = &platform.dogtag {
        report.push_str(&format!("\n  image:    {}", dogtag.trim()));
    }
    Ok(report)
}
