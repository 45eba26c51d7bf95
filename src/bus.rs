//! Physical-address bus: ordered device map, overlap-checked insertion,
//! byte-enable masked reads and writes.

use thiserror::Error;

/// A byte-sized, masked, aligned access interval: `{start, mask}` where
/// `size = mask + 1` and `start & mask == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrRange {
    pub start: u32,
    pub mask: u32,
}

impl AddrRange {
    pub fn new(start: u32, mask: u32) -> Self {
        assert_eq!(start & mask, 0, "AddrRange start must be aligned to its mask");
        AddrRange { start, mask }
    }

    pub fn size(&self) -> u32 {
        self.mask.wrapping_add(1)
    }

    pub fn end(&self) -> u32 {
        self.start.wrapping_add(self.mask)
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end()
    }

    pub fn offset(&self, addr: u32) -> u32 {
        addr & self.mask
    }
}

/// Describes an access: its byte width and, for writes, a per-byte enable mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusInfo {
    pub size: u8,
    pub write_enable: u8,
}

impl BusInfo {
    pub fn read(size: u8) -> Self {
        BusInfo { size, write_enable: 0 }
    }

    pub fn write(size: u8, write_enable: u8) -> Self {
        BusInfo { size, write_enable }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("address range {new_start:#010x}/{new_mask:#010x} overlaps existing range {old_start:#010x}/{old_mask:#010x}")]
    Overlap {
        old_start: u32,
        old_mask: u32,
        new_start: u32,
        new_mask: u32,
    },
    #[error("out of bound access at {addr:#010x} (size {size})")]
    OutOfBound { addr: u32, size: u8 },
}

pub type BusResult<T> = Result<T, BusError>;

/// A memory-mapped device. The bus is always the one doing address decoding;
/// a device only ever sees the in-device byte offset.
pub trait Device {
    fn read8(&self, offset: u32) -> u8;
    fn write8(&mut self, offset: u32, value: u8);
    fn reset(&mut self);
}

struct Mapping {
    range: AddrRange,
    name: &'static str,
    device: Box<dyn Device>,
}

/// Ordered sequence of `(AddrRange, Device)`. Ranges are checked pairwise
/// non-overlapping at insertion time; lookup is a linear scan in insertion
/// order, first match wins.
#[derive(Default)]
pub struct PaddrBus {
    mappings: Vec<Mapping>,
}

impl PaddrBus {
    pub fn new() -> Self {
        PaddrBus { mappings: Vec::new() }
    }

    pub fn add_device(
        &mut self,
        range: AddrRange,
        name: &'static str,
        device: Box<dyn Device>,
    ) -> BusResult<()> {
        for m in &self.mappings {
            let l_max = m.range.start.max(range.start);
            let r_min = m.range.end().min(range.end());
            if l_max < r_min {
                return Err(BusError::Overlap {
                    old_start: m.range.start,
                    old_mask: m.range.mask,
                    new_start: range.start,
                    new_mask: range.mask,
                });
            }
        }
        tracing::debug!(name, start = format!("{:#010x}", range.start), "device attached");
        self.mappings.push(Mapping { range, name, device });
        Ok(())
    }

    fn find(&self, addr: u32, size: u8) -> Option<usize> {
        self.mappings.iter().position(|m| {
            m.range.start <= addr
                && addr
                    .checked_add(size as u32 - 1)
                    .map_or(false, |end| end <= m.range.end())
        })
    }

    pub fn read(&self, addr: u32, info: BusInfo) -> BusResult<u32> {
        match self.find(addr, info.size) {
            Some(idx) => {
                let m = &self.mappings[idx];
                let off = m.range.offset(addr);
                let mut value = 0u32;
                for i in 0..info.size as u32 {
                    value |= (m.device.read8(off + i) as u32) << (8 * i);
                }
                Ok(value)
            }
            None => {
                tracing::warn!(addr = format!("{addr:#010x}"), size = info.size, "read out of bound");
                Err(BusError::OutOfBound { addr, size: info.size })
            }
        }
    }

    pub fn write(&mut self, addr: u32, info: BusInfo, data: u32) -> BusResult<()> {
        match self.find(addr, info.size) {
            Some(idx) => {
                let m = &mut self.mappings[idx];
                let off = m.range.offset(addr);
                for i in 0..info.size as u32 {
                    if info.write_enable & (1 << i) != 0 {
                        m.device.write8(off + i, (data >> (8 * i)) as u8);
                    }
                }
                Ok(())
            }
            None => {
                tracing::warn!(addr = format!("{addr:#010x}"), size = info.size, "write out of bound");
                Err(BusError::OutOfBound { addr, size: info.size })
            }
        }
    }

    pub fn reset(&mut self) {
        for m in &mut self.mappings {
            m.device.reset();
        }
    }

    pub fn device_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.mappings.iter().map(|m| m.name)
    }
}
