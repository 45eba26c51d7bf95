//! Board config/status register block: benchmark switch, LEDs, a free
//! running tick counter. Minimal reconstruction — the reference confreg's
//! full register set (7-segment display, buttons, DIP switches) isn't part
//! of this harness's observable surface, only the switch value and tick.

const REG_OPEN_TRIGGER: u32 = 0x00;
const REG_LED: u32 = 0x04;
const REG_NUM: u32 = 0x08;
const REG_SWITCH: u32 = 0x0C;
const REG_TIMER: u32 = 0x10;

/// Four-byte register backed by a little-endian `u32`, addressed at `base`.
fn reg_read(value: u32, base: u32, offset: u32) -> Option<u8> {
    if offset >= base && offset < base + 4 {
        Some(value.to_le_bytes()[(offset - base) as usize])
    } else {
        None
    }
}

fn reg_write(value: &mut u32, base: u32, offset: u32, byte: u8) -> bool {
    if offset >= base && offset < base + 4 {
        let mut bytes = value.to_le_bytes();
        bytes[(offset - base) as usize] = byte;
        *value = u32::from_le_bytes(bytes);
        true
    } else {
        false
    }
}

pub struct Confreg {
    open_trigger: u32,
    led: u32,
    num: u32,
    switch: u32,
    /// Free-running counter, advanced once per `DualSoc::tick`.
    timer: u32,
}

impl Confreg {
    pub fn new() -> Self {
        Confreg {
            open_trigger: 0,
            led: 0,
            num: 0,
            switch: 0,
            timer: 0,
        }
    }

    /// Selects the benchmark/test case exposed through `REG_SWITCH`.
    pub fn set_switch(&mut self, value: u8) {
        self.switch = value as u32;
    }

    pub fn tick(&mut self) {
        self.timer = self.timer.wrapping_add(1);
    }
}

impl Default for Confreg {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::bus::Device for Confreg {
    fn read8(&self, offset: u32) -> u8 {
        reg_read(self.open_trigger, REG_OPEN_TRIGGER, offset)
            .or_else(|| reg_read(self.led, REG_LED, offset))
            .or_else(|| reg_read(self.num, REG_NUM, offset))
            .or_else(|| reg_read(self.switch, REG_SWITCH, offset))
            .or_else(|| reg_read(self.timer, REG_TIMER, offset))
            .unwrap_or(0)
    }

    fn write8(&mut self, offset: u32, value: u8) {
        if reg_write(&mut self.open_trigger, REG_OPEN_TRIGGER, offset, value) {
            return;
        }
        if reg_write(&mut self.led, REG_LED, offset, value) {
            return;
        }
        if reg_write(&mut self.num, REG_NUM, offset, value) {
            return;
        }
        // REG_SWITCH is host-driven via `set_switch`, not bus-writable.
        reg_write(&mut self.timer, REG_TIMER, offset, value);
    }

    fn reset(&mut self) {
        self.open_trigger = 0;
        self.led = 0;
        self.num = 0;
        self.timer = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Device;

    #[test]
    fn switch_is_readable_at_its_register_offset() {
        let mut cfg = Confreg::new();
        cfg.set_switch(3);
        assert_eq!(cfg.read8(REG_SWITCH), 3);
        assert_eq!(cfg.read8(REG_SWITCH + 1), 0);
    }

    #[test]
    fn tick_advances_timer_register() {
        let mut cfg = Confreg::new();
        cfg.tick();
        cfg.tick();
        assert_eq!(cfg.read8(REG_TIMER), 2);
    }

    #[test]
    fn reset_clears_led_and_timer_but_not_switch() {
        let mut cfg = Confreg::new();
        cfg.set_switch(7);
        cfg.tick();
        cfg.write8(REG_LED, 0xFF);
        cfg.reset();
        assert_eq!(cfg.read8(REG_TIMER), 0);
        assert_eq!(cfg.read8(REG_LED), 0);
        assert_eq!(cfg.read8(REG_SWITCH), 7);
    }
}
