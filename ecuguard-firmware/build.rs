//! Build script for ecuguard-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates monitor.toml at compile time
//! - Generates the monitor configuration constants from monitor.toml

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Accepted watchdog timeout range (matches the watchdog monitor limits)
const WATCHDOG_TIMEOUT_RANGE: (i64, i64) = (10, 1000);

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse monitor.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=monitor.toml");

    let config_path = Path::new("monitor.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: monitor.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a monitor.toml configuration file.        ║\n\
            ║  Please create one in the ecuguard-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read monitor.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in monitor.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a boxed list of errors
fn report_errors(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Look up an integer field, recording an error when it is missing or out of range
fn int_field(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: (i64, i64),
    errors: &mut Vec<String>,
) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) => {
            if *value < range.0 || *value > range.1 {
                errors.push(format!(
                    "[{}] {} must be {}..={}",
                    section, key, range.0, range.1
                ));
            }
            *value
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

/// Look up a boolean field, falling back to `default` when absent
fn bool_field(
    config: &toml::Value,
    section: &str,
    key: &str,
    default: bool,
    errors: &mut Vec<String>,
) -> bool {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Boolean(value)) => *value,
        Some(_) => {
            errors.push(format!("[{}] {} must be true or false", section, key));
            default
        }
        None => default,
    }
}

/// Validate monitor.toml contents
fn validate_config(config: &toml::Value) {
    let mut errors = Vec::new();

    for section in ["watchdog", "monitor", "voltage", "temperature"] {
        match config.get(section) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", section)),
            None => errors.push(format!("Missing [{}] section", section)),
        }
    }
    report_errors("Missing required sections in monitor.toml", &errors);

    validate_timing(config);
    validate_voltage(config);
    validate_temperature(config);

    println!("cargo:warning=monitor.toml validated successfully");
}

fn validate_timing(config: &toml::Value) {
    let mut errors = Vec::new();

    let timeout = int_field(config, "watchdog", "timeout_ms", WATCHDOG_TIMEOUT_RANGE, &mut errors);
    let interval = int_field(config, "monitor", "check_interval_ms", (1, 1000), &mut errors);
    int_field(config, "monitor", "ram_test_pattern", (0, 255), &mut errors);
    int_field(config, "monitor", "clock_drift_limit_ppm", (1, 1_000_000), &mut errors);
    bool_field(config, "monitor", "enable_clock_monitor", true, &mut errors);
    bool_field(config, "monitor", "enable_flash_check", false, &mut errors);

    // The watchdog task only refreshes after a completed health pass
    if errors.is_empty() && interval * 2 > timeout {
        errors.push(format!(
            "check_interval_ms ({}) must be at most half of timeout_ms ({})",
            interval, timeout
        ));
    }

    report_errors("Invalid watchdog/monitor configuration", &errors);
}

fn validate_voltage(config: &toml::Value) {
    let mut errors = Vec::new();
    let range = (0, u16::MAX as i64);

    let under = int_field(config, "voltage", "undervolt_mv", range, &mut errors);
    let over = int_field(config, "voltage", "overvolt_mv", range, &mut errors);
    let nominal = int_field(config, "voltage", "nominal_mv", range, &mut errors);
    let hysteresis = int_field(config, "voltage", "hysteresis_mv", (1, 5000), &mut errors);

    if errors.is_empty() {
        if !(under < nominal && nominal < over) {
            errors.push("Require undervolt_mv < nominal_mv < overvolt_mv".to_string());
        }
        if nominal - hysteresis < under || nominal + hysteresis > over {
            errors.push("nominal_mv ± hysteresis_mv must stay within the limits".to_string());
        }
    }

    report_errors("Invalid voltage thresholds", &errors);
}

fn validate_temperature(config: &toml::Value) {
    let mut errors = Vec::new();
    let range = (i16::MIN as i64, i16::MAX as i64);

    let warn_high = int_field(config, "temperature", "warning_high_c", range, &mut errors);
    let shut_high = int_field(config, "temperature", "shutdown_high_c", range, &mut errors);
    let warn_low = int_field(config, "temperature", "warning_low_c", range, &mut errors);
    let shut_low = int_field(config, "temperature", "shutdown_low_c", range, &mut errors);
    int_field(config, "temperature", "hysteresis_c", (0, 50), &mut errors);

    if errors.is_empty() && !(shut_low < warn_low && warn_low < warn_high && warn_high < shut_high)
    {
        errors.push(
            "Require shutdown_low_c < warning_low_c < warning_high_c < shutdown_high_c"
                .to_string(),
        );
    }

    report_errors("Invalid temperature thresholds", &errors);
}

/// Write `$OUT_DIR/monitor_config.rs` with the validated values
fn generate_config(config: &toml::Value) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut errors = Vec::new();

    let int = |section: &str, key: &str| -> i64 {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_integer())
            .unwrap()
    };
    let clock_monitor = bool_field(config, "monitor", "enable_clock_monitor", true, &mut errors);
    let flash_check = bool_field(config, "monitor", "enable_flash_check", false, &mut errors);

    let source = format!(
        "// Generated by build.rs from monitor.toml\n\
         \n\
         pub const WATCHDOG_TIMEOUT_MS: u32 = {timeout};\n\
         \n\
         pub const MONITOR_CONFIG: MonitorConfig = MonitorConfig {{\n\
         \x20   voltage: VoltageThresholds {{\n\
         \x20       undervolt_mv: {under},\n\
         \x20       overvolt_mv: {over},\n\
         \x20       nominal_mv: {nominal},\n\
         \x20       hysteresis_mv: {vhyst},\n\
         \x20   }},\n\
         \x20   temperature: TemperatureThresholds {{\n\
         \x20       warning_high_c: {warn_high},\n\
         \x20       shutdown_high_c: {shut_high},\n\
         \x20       warning_low_c: {warn_low},\n\
         \x20       shutdown_low_c: {shut_low},\n\
         \x20       hysteresis_c: {thyst},\n\
         \x20   }},\n\
         \x20   check_interval_ms: {interval},\n\
         \x20   ram_test_pattern: {pattern:#04x},\n\
         \x20   enable_clock_monitor: {clock_monitor},\n\
         \x20   clock_drift_limit_ppm: {drift},\n\
         \x20   enable_flash_check: {flash_check},\n\
         }};\n",
        timeout = int("watchdog", "timeout_ms"),
        under = int("voltage", "undervolt_mv"),
        over = int("voltage", "overvolt_mv"),
        nominal = int("voltage", "nominal_mv"),
        vhyst = int("voltage", "hysteresis_mv"),
        warn_high = int("temperature", "warning_high_c"),
        shut_high = int("temperature", "shutdown_high_c"),
        warn_low = int("temperature", "warning_low_c"),
        shut_low = int("temperature", "shutdown_low_c"),
        thyst = int("temperature", "hysteresis_c"),
        interval = int("monitor", "check_interval_ms"),
        pattern = int("monitor", "ram_test_pattern"),
        drift = int("monitor", "clock_drift_limit_ppm"),
    );

    fs::write(out_dir.join("monitor_config.rs"), source).unwrap();
}
