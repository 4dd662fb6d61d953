//! Waveform audio device enumeration.

use windows::Win32::Media::Audio::{
    waveInGetDevCapsW, waveInGetNumDevs, waveOutGetDevCapsW, waveOutGetNumDevs, WAVEINCAPSW,
    WAVEOUTCAPSW,
};

use wavekit_core::models::device_info::{DeviceInfo, DeviceKind};

fn name_from_utf16(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}

/// List all waveform capture devices present on the system.
pub fn list_capture_devices() -> Vec<DeviceInfo> {
    let count = unsafe { waveInGetNumDevs() };
    let mut devices = Vec::with_capacity(count as usize);

    for index in 0..count {
        let mut caps = WAVEINCAPSW::default();
        let result = unsafe {
            waveInGetDevCapsW(
                index as usize,
                &mut caps,
                std::mem::size_of::<WAVEINCAPSW>() as u32,
            )
        };
        if result != 0 {
            log::warn!("waveInGetDevCaps({index}) failed with {result:#06x}");
            continue;
        }
        devices.push(DeviceInfo {
            index,
            name: name_from_utf16(&caps.szPname),
            kind: DeviceKind::Capture,
            channels: caps.wChannels,
            // Device 0 is the waveform mapper's first choice.
            is_default: index == 0,
        });
    }
    devices
}

/// List all waveform playback devices present on the system.
pub fn list_playback_devices() -> Vec<DeviceInfo> {
    let count = unsafe { waveOutGetNumDevs() };
    let mut devices = Vec::with_capacity(count as usize);

    for index in 0..count {
        let mut caps = WAVEOUTCAPSW::default();
        let result = unsafe {
            waveOutGetDevCapsW(
                index as usize,
                &mut caps,
                std::mem::size_of::<WAVEOUTCAPSW>() as u32,
            )
        };
        if result != 0 {
            log::warn!("waveOutGetDevCaps({index}) failed with {result:#06x}");
            continue;
        }
        devices.push(DeviceInfo {
            index,
            name: name_from_utf16(&caps.szPname),
            kind: DeviceKind::Playback,
            channels: caps.wChannels,
            is_default: index == 0,
        });
    }
    devices
}

/// List every waveform device, capture first.
pub fn list_devices() -> Vec<DeviceInfo> {
    let mut devices = list_capture_devices();
    devices.extend(list_playback_devices());
    devices
}
