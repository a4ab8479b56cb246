//! Voltage telemetry with a per-register refresh interval.

use embassy_time::{Duration, Instant};

use crate::client::RegisterClient;
use crate::error::Error;
use crate::regs;

pub const NUM_CHANNELS: usize = 5;

/// A cached reading older than this is read again from the device.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

const LABELS: [&str; NUM_CHANNELS] = ["BOARD 5V", "SoC 5V", "SoC 3V3", "SoC 1V8", "Vin 24V"];

/// Which of the three registers of a channel to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageKind {
    Input,
    Min,
    Max,
}

impl VoltageKind {
    pub const ALL: [VoltageKind; 3] = [VoltageKind::Input, VoltageKind::Min, VoltageKind::Max];

    const fn base(self) -> u8 {
        match self {
            VoltageKind::Input => regs::VOLTAGE_BASE,
            VoltageKind::Min => regs::VOLTAGE_MIN_BASE,
            VoltageKind::Max => regs::VOLTAGE_MAX_BASE,
        }
    }

    const fn slot(self) -> usize {
        match self {
            VoltageKind::Input => 0,
            VoltageKind::Min => 1,
            VoltageKind::Max => 2,
        }
    }
}

/// Attributes a monitoring framework may ask for on a voltage channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageAttr {
    Input,
    Min,
    Max,
    Label,
}

impl VoltageAttr {
    /// The register kind backing a numeric attribute.
    pub const fn kind(self) -> Option<VoltageKind> {
        match self {
            VoltageAttr::Input => Some(VoltageKind::Input),
            VoltageAttr::Min => Some(VoltageKind::Min),
            VoltageAttr::Max => Some(VoltageKind::Max),
            VoltageAttr::Label => None,
        }
    }
}

/// A validated channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageChannel(u8);

impl VoltageChannel {
    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < NUM_CHANNELS { Some(Self(id)) } else { None }
    }

    pub const fn id(self) -> u8 {
        self.0
    }

    pub const fn label(self) -> &'static str {
        LABELS[self.0 as usize]
    }

    pub const fn register(self, kind: VoltageKind) -> u8 {
        kind.base() + self.0 * regs::VOLTAGE_CHANNEL_STRIDE
    }
}

#[derive(Clone, Copy)]
struct Slot {
    value: u16,
    last_refresh: Instant,
    valid: bool,
}

impl Slot {
    const EMPTY: Self = Self {
        value: 0,
        last_refresh: Instant::MIN,
        valid: false,
    };

    fn is_fresh(&self, now: Instant) -> bool {
        self.valid && now.saturating_duration_since(self.last_refresh) <= REFRESH_INTERVAL
    }
}

/// Millivolt readings for every channel and kind.
pub(crate) struct VoltageCache {
    slots: [[Slot; 3]; NUM_CHANNELS],
}

impl VoltageCache {
    pub(crate) const fn new() -> Self {
        Self {
            slots: [[Slot::EMPTY; 3]; NUM_CHANNELS],
        }
    }

    /// Return the cached value, reading the register first if the slot is
    /// empty or stale. A failed read leaves the slot as it was.
    pub(crate) fn get<C: RegisterClient>(
        &mut self,
        client: &mut C,
        channel: u8,
        kind: VoltageKind,
        now: Instant,
    ) -> Result<u16, Error<C::Error>> {
        let channel = VoltageChannel::new(channel).ok_or(Error::Unsupported)?;
        let slot = &mut self.slots[channel.id() as usize][kind.slot()];

        if slot.is_fresh(now) {
            return Ok(slot.value);
        }

        let value = client.read(channel.register(kind)).map_err(|e| {
            error!("failed to read voltage channel {}", channel.id());
            Error::Comm(e)
        })?;
        trace!("voltage channel {} refreshed: {} mV", channel.id(), value);

        *slot = Slot {
            value,
            last_refresh: now,
            valid: true,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct CountingClient {
        reads: Vec<u8>,
        fail: bool,
    }

    impl RegisterClient for CountingClient {
        type Error = ();

        fn read(&mut self, addr: u8) -> Result<u16, ()> {
            self.reads.push(addr);
            if self.fail { Err(()) } else { Ok(5000 + addr as u16) }
        }

        fn write(&mut self, _addr: u8, _value: u16) -> Result<(), ()> {
            unreachable!("voltage reads never write")
        }
    }

    const T0: Instant = Instant::from_secs(100);

    #[test]
    fn register_layout() {
        let ch = |id| VoltageChannel::new(id).unwrap();
        assert_eq!(ch(0).register(VoltageKind::Input), 0x0a);
        assert_eq!(ch(0).register(VoltageKind::Min), 0x0b);
        assert_eq!(ch(0).register(VoltageKind::Max), 0x0c);
        assert_eq!(ch(1).register(VoltageKind::Input), 0x0d);
        assert_eq!(ch(4).register(VoltageKind::Max), 0x18);
        assert_eq!(ch(4).label(), "Vin 24V");
        assert_eq!(VoltageChannel::new(5), None);
    }

    #[test]
    fn cached_within_interval() {
        let mut cache = VoltageCache::new();
        let mut client = CountingClient::default();

        let first = cache.get(&mut client, 0, VoltageKind::Input, T0).unwrap();
        let second = cache
            .get(&mut client, 0, VoltageKind::Input, T0 + Duration::from_millis(999))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(client.reads, [0x0a]);

        // Exactly one interval old still counts as fresh.
        cache
            .get(&mut client, 0, VoltageKind::Input, T0 + REFRESH_INTERVAL)
            .unwrap();
        assert_eq!(client.reads.len(), 1);
    }

    #[test]
    fn refreshed_after_interval() {
        let mut cache = VoltageCache::new();
        let mut client = CountingClient::default();

        cache.get(&mut client, 0, VoltageKind::Input, T0).unwrap();
        cache
            .get(&mut client, 0, VoltageKind::Input, T0 + Duration::from_millis(1001))
            .unwrap();
        assert_eq!(client.reads, [0x0a, 0x0a]);
    }

    #[test]
    fn kinds_are_cached_independently() {
        let mut cache = VoltageCache::new();
        let mut client = CountingClient::default();

        for kind in VoltageKind::ALL {
            cache.get(&mut client, 2, kind, T0).unwrap();
        }
        for kind in VoltageKind::ALL {
            cache.get(&mut client, 2, kind, T0).unwrap();
        }
        assert_eq!(client.reads, [0x10, 0x11, 0x12]);
    }

    #[test]
    fn out_of_range_channel_touches_nothing() {
        let mut cache = VoltageCache::new();
        let mut client = CountingClient::default();

        for kind in VoltageKind::ALL {
            assert_eq!(cache.get(&mut client, 5, kind, T0), Err(Error::Unsupported));
        }
        assert!(client.reads.is_empty());
    }

    #[test]
    fn failed_refresh_is_retried() {
        let mut cache = VoltageCache::new();
        let mut client = CountingClient::default();

        assert_eq!(cache.get(&mut client, 1, VoltageKind::Max, T0), Ok(5000 + 0x0f));

        client.fail = true;
        let later = T0 + Duration::from_secs(2);
        assert_eq!(
            cache.get(&mut client, 1, VoltageKind::Max, later),
            Err(Error::Comm(()))
        );

        // Slot untouched by the failure, so the next call retries the read.
        client.fail = false;
        assert_eq!(cache.get(&mut client, 1, VoltageKind::Max, later), Ok(5000 + 0x0f));
        assert_eq!(client.reads.len(), 3);
    }

    #[test]
    fn failure_on_empty_slot_does_not_cache() {
        let mut cache = VoltageCache::new();
        let mut client = CountingClient {
            fail: true,
            ..Default::default()
        };

        assert!(cache.get(&mut client, 3, VoltageKind::Input, T0).is_err());
        client.fail = false;
        assert!(cache.get(&mut client, 3, VoltageKind::Input, T0).is_ok());
        assert_eq!(client.reads.len(), 2);
    }
}
