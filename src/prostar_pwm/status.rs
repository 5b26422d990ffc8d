//! Live telemetry from the input (RAM) register map. All 32 bit fields here
//! are high word first.

use crate::{
    bitfield::{
        AlarmDetails, Alarms, ArrayFaultDetails, ArrayFaults, LoadFaultDetails, LoadFaults,
    },
    decode::WordOrder::HighFirst,
    error::Result,
    registers::Registers,
    state::{ChargeState, ChargeStatusLedState, LedState, LoadState},
    transport::{RegisterRegion, Transport},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawAdcData {
    /// V, 3.3V supply
    pub supply_voltage_3v3: Option<f32>,
    /// V
    pub gate_drive_voltage: Option<f32>,
    /// V
    pub meterbus_supply_voltage: Option<f32>,
    /// V
    pub internal_reference_voltage: Option<f32>,
    /// V, negative rail for current measurement
    pub negative_current_supply_rail: Option<f32>,
    /// V
    pub load_fet_gate_voltage: Option<f32>,
    /// V
    pub array_fet_gate_voltage: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredAdcData {
    /// A
    pub array_current: Option<f32>,
    /// V
    pub battery_terminal_voltage: Option<f32>,
    /// V
    pub array_voltage: Option<f32>,
    /// V
    pub load_voltage: Option<f32>,
    /// A
    pub load_current: Option<f32>,
    /// V
    pub battery_sense_voltage: Option<f32>,
    /// V, 60s filter
    pub battery_voltage_slow: Option<f32>,
    /// A net, 60s filter
    pub battery_current_slow: Option<f32>,
}

/// All in ºC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureData {
    pub heatsink: Option<f32>,
    /// Whichever of ambient or the remote sensor is in use.
    pub battery: Option<f32>,
    pub ambient: Option<f32>,
    pub remote: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargerStatus {
    pub charge_state: Option<ChargeState>,
    pub array_fault: Option<ArrayFaultDetails>,
    /// V, 25s filter
    pub battery_voltage: Option<f32>,
    /// V, regulator target
    pub battery_reference_voltage: Option<f32>,
    pub ah_charge_resettable: Option<f32>,
    pub ah_charge_total: Option<f32>,
    pub kwh_charge_resettable: Option<f32>,
    pub kwh_charge_total: Option<f32>,
    /// ºC
    pub battery_temp_foldback_100_limit: Option<f32>,
    /// ºC
    pub battery_temp_foldback_0_limit: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadStatus {
    pub load_state: Option<LoadState>,
    pub load_fault: Option<LoadFaultDetails>,
    /// V, LVD setpoint after current compensation
    pub lvd_voltage_compensated: Option<f32>,
    /// V
    pub load_hvd_voltage: Option<f32>,
    pub ah_load_resettable: Option<f32>,
    pub ah_load_total: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiscData {
    /// hours
    pub hourmeter: Option<u32>,
    pub alarm: Option<AlarmDetails>,
    pub dip_switch: Option<u16>,
    pub led_state: Option<LedState>,
    pub charge_status_led_state: Option<ChargeStatusLedState>,
    pub lighting_should_be_on: Option<u16>,
}

fn input<T: Transport + ?Sized>(t: &mut T) -> Registers<'_, T> {
    Registers::new(t, RegisterRegion::Input)
}

pub(crate) fn read_raw_adc<T: Transport + ?Sized>(t: &mut T) -> Result<RawAdcData> {
    let mut r = input(t);
    Ok(RawAdcData {
        supply_voltage_3v3: r.read_f16(0x0004)?,
        gate_drive_voltage: r.read_f16(0x0005)?,
        meterbus_supply_voltage: r.read_f16(0x0006)?,
        internal_reference_voltage: r.read_f16(0x0007)?,
        negative_current_supply_rail: r.read_f16(0x0008)?,
        load_fet_gate_voltage: r.read_f16(0x0009)?,
        array_fet_gate_voltage: r.read_f16(0x000a)?,
    })
}

pub(crate) fn read_filtered_adc<T: Transport + ?Sized>(t: &mut T) -> Result<FilteredAdcData> {
    let mut r = input(t);
    Ok(FilteredAdcData {
        array_current: r.read_f16(0x0011)?,
        battery_terminal_voltage: r.read_f16(0x0012)?,
        array_voltage: r.read_f16(0x0013)?,
        load_voltage: r.read_f16(0x0014)?,
        // 0x0015 is not used
        load_current: r.read_f16(0x0016)?,
        battery_sense_voltage: r.read_f16(0x0017)?,
        battery_voltage_slow: r.read_f16(0x0018)?,
        battery_current_slow: r.read_f16(0x0019)?,
    })
}

pub(crate) fn read_temperatures<T: Transport + ?Sized>(t: &mut T) -> Result<TemperatureData> {
    let mut r = input(t);
    Ok(TemperatureData {
        heatsink: r.read_f16(0x001a)?,
        battery: r.read_f16(0x001b)?,
        ambient: r.read_f16(0x001c)?,
        remote: r.read_f16(0x001d)?,
    })
}

pub(crate) fn read_charger_status<T: Transport + ?Sized>(t: &mut T) -> Result<ChargerStatus> {
    let mut r = input(t);
    Ok(ChargerStatus {
        charge_state: r.read_code(0x0021)?,
        array_fault: r.read_bits16::<ArrayFaults>(0x0022)?,
        battery_voltage: r.read_f16(0x0023)?,
        battery_reference_voltage: r.read_f16(0x0024)?,
        ah_charge_resettable: r.read_scaled32(0x0026, HighFirst, 10.)?,
        ah_charge_total: r.read_scaled32(0x0028, HighFirst, 10.)?,
        kwh_charge_resettable: r.read_scaled16(0x002a, 10.)?,
        kwh_charge_total: r.read_scaled16(0x002b, 10.)?,
        battery_temp_foldback_100_limit: r.read_f16(0x002c)?,
        battery_temp_foldback_0_limit: r.read_f16(0x002d)?,
    })
}

pub(crate) fn read_load_status<T: Transport + ?Sized>(t: &mut T) -> Result<LoadStatus> {
    let mut r = input(t);
    Ok(LoadStatus {
        load_state: r.read_code(0x002e)?,
        load_fault: r.read_bits16::<LoadFaults>(0x002f)?,
        lvd_voltage_compensated: r.read_f16(0x0030)?,
        load_hvd_voltage: r.read_f16(0x0031)?,
        ah_load_resettable: r.read_scaled32(0x0032, HighFirst, 10.)?,
        ah_load_total: r.read_scaled32(0x0034, HighFirst, 10.)?,
    })
}

pub(crate) fn read_misc<T: Transport + ?Sized>(t: &mut T) -> Result<MiscData> {
    let mut r = input(t);
    Ok(MiscData {
        hourmeter: r.read_raw32(0x0036, HighFirst)?,
        alarm: r.read_bits32::<Alarms>(0x0038, HighFirst)?,
        dip_switch: r.read_raw16(0x003a)?,
        led_state: r.read_code(0x003b)?,
        charge_status_led_state: r.read_code(0x004d)?,
        lighting_should_be_on: r.read_raw16(0x004e)?,
    })
}
