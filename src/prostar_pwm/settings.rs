//! EEPROM settings and lifetime statistics from the holding register map.
//! 32 bit values in EEPROM are stored low word first.

use crate::{
    bitfield::{
        AlarmDetails, Alarms, ArrayFaultDetails, ArrayFaults, LoadFaultDetails, LoadFaults,
    },
    decode::WordOrder::LowFirst,
    error::Result,
    registers::Registers,
    transport::{RegisterRegion, Transport},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeSettings {
    /// V
    pub regulation_voltage_25c: Option<f32>,
    /// V
    pub float_voltage_25c: Option<f32>,
    /// seconds
    pub time_before_float: Option<u16>,
    /// seconds
    pub time_before_float_low_battery: Option<u16>,
    /// V
    pub low_battery_float_trigger_voltage: Option<f32>,
    /// V
    pub float_cancel_voltage: Option<f32>,
    /// seconds
    pub float_exit_time: Option<u16>,
    /// V
    pub equalize_voltage_25c: Option<f32>,
    pub days_between_equalize: Option<u16>,
    /// minutes
    pub equalize_time_above_regulation: Option<u16>,
    /// minutes
    pub equalize_time_at_equalize: Option<u16>,
    /// V
    pub reference_charge_voltage_limit: Option<f32>,
    /// V/ºC
    pub temp_compensation_coefficient: Option<f32>,
    /// V
    pub hvd_voltage_25c: Option<f32>,
    /// V
    pub hvr_voltage: Option<f32>,
    /// V
    pub max_charge_voltage_reference: Option<f32>,
    /// ºC
    pub max_battery_temp_compensation_limit: Option<i16>,
    /// ºC
    pub min_battery_temp_compensation_limit: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSettings {
    /// V
    pub lvd_voltage: Option<f32>,
    /// V
    pub lvr_voltage: Option<f32>,
    /// V
    pub load_hvd_voltage: Option<f32>,
    /// V
    pub load_hvr_voltage: Option<f32>,
    /// Ω
    pub lvd_load_current_compensation: Option<f32>,
    /// seconds
    pub lvd_warning_timeout: Option<u16>,
}

/// State of charge LED thresholds, in V, plus bus ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiscSettings {
    pub led_green_to_green_yellow: Option<f32>,
    pub led_green_yellow_to_yellow: Option<f32>,
    pub led_yellow_to_yellow_red: Option<f32>,
    pub led_yellow_red_to_red_flashing: Option<f32>,
    pub modbus_id: Option<u16>,
    pub meterbus_id: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PwmSettings {
    /// A
    pub charge_current_limit: Option<f32>,
}

/// Lifetime accumulators and history kept in EEPROM. Logically status, but
/// it lives in the holding map and follows its low word first layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub ah_charge_resettable: Option<f32>,
    pub ah_charge_total: Option<f32>,
    pub kwh_charge_resettable: Option<f32>,
    pub kwh_charge_total: Option<f32>,
    pub ah_load_resettable: Option<f32>,
    pub ah_load_total: Option<f32>,
    /// hours
    pub hourmeter: Option<u32>,
    pub alarm_history: Option<AlarmDetails>,
    pub array_fault_history: Option<ArrayFaultDetails>,
    pub load_fault_history: Option<LoadFaultDetails>,
    /// V
    pub battery_voltage_min: Option<f32>,
    /// V
    pub battery_voltage_max: Option<f32>,
    /// V
    pub array_voltage_max: Option<f32>,
    pub days_since_equalize: Option<u16>,
}

fn holding<T: Transport + ?Sized>(t: &mut T) -> Registers<'_, T> {
    Registers::new(t, RegisterRegion::Holding)
}

pub(crate) fn read_charge_settings<T: Transport + ?Sized>(t: &mut T) -> Result<ChargeSettings> {
    let mut r = holding(t);
    Ok(ChargeSettings {
        regulation_voltage_25c: r.read_f16(0xe000)?,
        float_voltage_25c: r.read_f16(0xe001)?,
        time_before_float: r.read_raw16(0xe002)?,
        time_before_float_low_battery: r.read_raw16(0xe003)?,
        low_battery_float_trigger_voltage: r.read_f16(0xe004)?,
        float_cancel_voltage: r.read_f16(0xe005)?,
        float_exit_time: r.read_raw16(0xe006)?,
        equalize_voltage_25c: r.read_f16(0xe007)?,
        days_between_equalize: r.read_raw16(0xe008)?,
        equalize_time_above_regulation: r.read_raw16(0xe009)?,
        equalize_time_at_equalize: r.read_raw16(0xe00a)?,
        reference_charge_voltage_limit: r.read_f16(0xe010)?,
        temp_compensation_coefficient: r.read_f16(0xe01a)?,
        hvd_voltage_25c: r.read_f16(0xe01b)?,
        hvr_voltage: r.read_f16(0xe01c)?,
        max_charge_voltage_reference: r.read_f16(0xe01d)?,
        max_battery_temp_compensation_limit: r.read_i16(0xe01e)?,
        min_battery_temp_compensation_limit: r.read_i16(0xe01f)?,
    })
}

pub(crate) fn read_load_settings<T: Transport + ?Sized>(t: &mut T) -> Result<LoadSettings> {
    let mut r = holding(t);
    Ok(LoadSettings {
        lvd_voltage: r.read_f16(0xe022)?,
        lvr_voltage: r.read_f16(0xe023)?,
        load_hvd_voltage: r.read_f16(0xe024)?,
        load_hvr_voltage: r.read_f16(0xe025)?,
        lvd_load_current_compensation: r.read_f16(0xe026)?,
        lvd_warning_timeout: r.read_raw16(0xe027)?,
    })
}

pub(crate) fn read_misc_settings<T: Transport + ?Sized>(t: &mut T) -> Result<MiscSettings> {
    let mut r = holding(t);
    Ok(MiscSettings {
        led_green_to_green_yellow: r.read_f16(0xe030)?,
        led_green_yellow_to_yellow: r.read_f16(0xe031)?,
        led_yellow_to_yellow_red: r.read_f16(0xe032)?,
        led_yellow_red_to_red_flashing: r.read_f16(0xe033)?,
        modbus_id: r.read_raw16(0xe034)?,
        meterbus_id: r.read_raw16(0xe035)?,
    })
}

pub(crate) fn read_pwm_settings<T: Transport + ?Sized>(t: &mut T) -> Result<PwmSettings> {
    let mut r = holding(t);
    Ok(PwmSettings {
        charge_current_limit: r.read_f16(0xe038)?,
    })
}

pub(crate) fn read_statistics<T: Transport + ?Sized>(t: &mut T) -> Result<Statistics> {
    let mut r = holding(t);
    Ok(Statistics {
        ah_charge_resettable: r.read_scaled32(0xe080, LowFirst, 10.)?,
        ah_charge_total: r.read_scaled32(0xe082, LowFirst, 10.)?,
        kwh_charge_resettable: r.read_scaled16(0xe084, 10.)?,
        kwh_charge_total: r.read_scaled16(0xe085, 10.)?,
        ah_load_resettable: r.read_scaled32(0xe086, LowFirst, 10.)?,
        ah_load_total: r.read_scaled32(0xe088, LowFirst, 10.)?,
        hourmeter: r.read_raw32(0xe08a, LowFirst)?,
        alarm_history: r.read_bits32::<Alarms>(0xe08c, LowFirst)?,
        array_fault_history: r.read_bits16::<ArrayFaults>(0xe08e)?,
        load_fault_history: r.read_bits16::<LoadFaults>(0xe08f)?,
        battery_voltage_min: r.read_f16(0xe090)?,
        battery_voltage_max: r.read_f16(0xe091)?,
        array_voltage_max: r.read_f16(0xe092)?,
        days_since_equalize: r.read_raw16(0xe093)?,
    })
}
