//! Fetch/decode/execute for a single REF step.
//!
//! Mirrors `isa_exec_once` from the original interpreter: branches and jumps
//! never assign `pc` directly, they schedule a delay-slot target that takes
//! effect on the *following* step. `eret` is the one exception — it has no
//! delay slot and redirects `pc` immediately.

use super::decode::{self, Op, OperandKind, Operands};
use super::exception::Exception;
use super::{ArchState, Flag, InstState};
use crate::bus::{BusInfo, PaddrBus};

/// A completed load or store, surfaced for `Mtracer`.
#[derive(Debug, Clone, Copy)]
pub enum MemAccess {
    Read { addr: u32, size: u8, value: u32 },
    Write { addr: u32, size: u8, write_enable: u8, value: u32 },
}

/// What a single `step()` call retired.
pub struct StepOutcome {
    pub pc: u32,
    pub next_pc: u32,
    pub inst: u32,
    pub exception: Option<Exception>,
    pub flag: Flag,
    pub mem: Option<MemAccess>,
}

enum ExecResult {
    Next,
    /// Schedule a delay-slot branch: `pc` advances normally this step, the
    /// target takes effect after the next instruction retires.
    Branch(u32),
    /// Redirect `pc` immediately, no delay slot (`eret`).
    Direct(u32),
}

/// One architectural core: register file, CP0, and the delay-slot pipeline
/// state needed to retire branches one step late.
pub struct Interpreter {
    pub arch: ArchState,
    pub inst: InstState,
    next_is_delay_slot: bool,
    delay_slot_npc: u32,
    pub hilo_valid: bool,
    last_mem: Option<MemAccess>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            arch: ArchState::new(),
            inst: InstState::default(),
            next_is_delay_slot: false,
            delay_slot_npc: 0,
            hilo_valid: true,
            last_mem: None,
        }
    }

    pub fn restart(&mut self) {
        self.arch.restart();
        self.inst = InstState::default();
        self.next_is_delay_slot = false;
        self.delay_slot_npc = 0;
        self.hilo_valid = true;
        self.last_mem = None;
    }

    /// `ref_tick_and_int`: advances `count`/`random`, latches interrupt
    /// lines. Called once per step, before `step()`.
    pub fn tick_cp0(&mut self, ext_int: u8) {
        self.arch.cp0.tick_and_int(ext_int);
    }

    /// REF's own view of whether an interrupt is live, queried by the
    /// differential engine for `int_delay` bookkeeping — independent of
    /// whether this step actually delivers one.
    pub fn pending_irq(&self) -> bool {
        self.arch.cp0.pending_irq_masked_by_status()
    }

    fn write_gpr(&mut self, rd: u32, value: u32) {
        self.arch.write_gpr(rd, value);
        self.inst.wnum = rd;
        self.inst.wdata = value;
    }

    fn mem_read(&mut self, bus: &PaddrBus, addr: u32, size: u8) -> Result<u32, Exception> {
        let value = bus.read(addr, BusInfo::read(size)).map_err(|_| Exception::AdEL(addr))?;
        self.last_mem = Some(MemAccess::Read { addr, size, value });
        Ok(value)
    }

    fn mem_write(
        &mut self,
        bus: &mut PaddrBus,
        addr: u32,
        size: u8,
        write_enable: u8,
        value: u32,
    ) -> Result<(), Exception> {
        bus.write(addr, BusInfo::write(size, write_enable), value)
            .map_err(|_| Exception::AdES(addr))?;
        self.last_mem = Some(MemAccess::Write { addr, size, write_enable, value });
        Ok(())
    }

    /// Takes the field for the step that just retired, for `DiffEngine`.
    pub fn take_mem(&mut self) -> Option<MemAccess> {
        self.last_mem.take()
    }

    /// `has_int` is the DUT's own asserted-exception-this-retire signal —
    /// REF is driven onto the interrupt path in lockstep with it rather than
    /// on its own independent timing, so the two retire streams stay
    /// comparable (the source's `ref_exec_once(bool mycpu_int)` passes the
    /// DUT's signal straight into `isa_exec_once`).
    pub fn step(&mut self, bus: &mut PaddrBus, has_int: bool) -> StepOutcome {
        let this_pc = self.arch.pc;
        let is_delay_slot = self.next_is_delay_slot;
        self.next_is_delay_slot = false;
        self.last_mem = None;

        self.inst = InstState {
            pc: this_pc,
            is_delay_slot,
            ..InstState::default()
        };

        let mut exception = None;
        let mut dnpc;
        let mut raw_inst = 0u32;

        if this_pc & 0x3 != 0 {
            let exc = Exception::AdEL(this_pc);
            dnpc = self.arch.cp0.raise_exception(exc, this_pc, is_delay_slot);
            exception = Some(exc);
        } else {
            match self.mem_read(bus, this_pc, 4) {
                Err(exc) => {
                    dnpc = self.arch.cp0.raise_exception(exc, this_pc, is_delay_slot);
                    exception = Some(exc);
                }
                Ok(fetched) => {
                    raw_inst = fetched;
                    self.last_mem = None; // fetch is not a data access
                    self.inst.inst = raw_inst;
                    let snpc = this_pc.wrapping_add(4);
                    self.inst.snpc = snpc;
                    dnpc = if is_delay_slot { self.delay_slot_npc } else { snpc };

                    if has_int {
                        let exc = Exception::Int;
                        dnpc = self.arch.cp0.raise_exception(exc, this_pc, is_delay_slot);
                        exception = Some(exc);
                    } else {
                        let (kind, op) = decode::decode(raw_inst);
                        let ops = decode::decode_operands(raw_inst, kind, &self.arch.gpr);
                        match self.execute(bus, raw_inst, op, ops, this_pc, snpc) {
                            Ok(ExecResult::Next) => {}
                            Ok(ExecResult::Branch(target)) => {
                                self.next_is_delay_slot = true;
                                self.delay_slot_npc = target;
                            }
                            Ok(ExecResult::Direct(target)) => {
                                dnpc = target;
                            }
                            Err(exc) => {
                                dnpc = self.arch.cp0.raise_exception(exc, this_pc, is_delay_slot);
                                exception = Some(exc);
                            }
                        }
                    }
                }
            }
        }

        self.arch.gpr[0] = 0;
        self.arch.pc = dnpc;
        self.inst.dnpc = dnpc;

        StepOutcome {
            pc: this_pc,
            next_pc: dnpc,
            inst: raw_inst,
            exception,
            flag: self.inst.flag,
            mem: self.take_mem(),
        }
    }

    fn execute(
        &mut self,
        bus: &mut PaddrBus,
        raw: u32,
        op: Op,
        ops: Operands,
        this_pc: u32,
        snpc: u32,
    ) -> Result<ExecResult, Exception> {
        use Op::*;

        let rs1 = ops.src1;
        let rs2 = ops.src2;
        let rd = ops.rd;
        let imm = ops.imm;

        match op {
            Add => match (rs1 as i32).checked_add(rs2 as i32) {
                Some(v) => self.write_gpr(rd, v as u32),
                None => return Err(Exception::Ov),
            },
            Addu => self.write_gpr(rd, rs1.wrapping_add(rs2)),
            Sub => match (rs1 as i32).checked_sub(rs2 as i32) {
                Some(v) => self.write_gpr(rd, v as u32),
                None => return Err(Exception::Ov),
            },
            Subu => self.write_gpr(rd, rs1.wrapping_sub(rs2)),
            And => self.write_gpr(rd, rs1 & rs2),
            Or => self.write_gpr(rd, rs1 | rs2),
            Xor => self.write_gpr(rd, rs1 ^ rs2),
            Nor => self.write_gpr(rd, !(rs1 | rs2)),
            Slt => self.write_gpr(rd, ((rs1 as i32) < (rs2 as i32)) as u32),
            Sltu => self.write_gpr(rd, (rs1 < rs2) as u32),
            Sll => {
                let shamt = decode::bits(raw, 10, 6);
                self.write_gpr(rd, rs2 << shamt);
            }
            Srl => {
                let shamt = decode::bits(raw, 10, 6);
                self.write_gpr(rd, rs2 >> shamt);
            }
            Sra => {
                let shamt = decode::bits(raw, 10, 6);
                self.write_gpr(rd, ((rs2 as i32) >> shamt) as u32);
            }
            Sllv => self.write_gpr(rd, rs2 << (rs1 & 0x1F)),
            Srlv => self.write_gpr(rd, rs2 >> (rs1 & 0x1F)),
            Srav => self.write_gpr(rd, ((rs2 as i32) >> (rs1 & 0x1F)) as u32),
            Mult => {
                let prod = (rs1 as i32 as i64).wrapping_mul(rs2 as i32 as i64) as u64;
                self.arch.lo = prod as u32;
                self.arch.hi = (prod >> 32) as u32;
                self.hilo_valid = true;
            }
            Multu => {
                let prod = (rs1 as u64).wrapping_mul(rs2 as u64);
                self.arch.lo = prod as u32;
                self.arch.hi = (prod >> 32) as u32;
                self.hilo_valid = true;
            }
            Div => {
                if rs2 != 0 {
                    self.arch.lo = ((rs1 as i32).wrapping_div(rs2 as i32)) as u32;
                    self.arch.hi = ((rs1 as i32).wrapping_rem(rs2 as i32)) as u32;
                }
                self.hilo_valid = rs2 != 0;
            }
            Divu => {
                if rs2 != 0 {
                    self.arch.lo = rs1 / rs2;
                    self.arch.hi = rs1 % rs2;
                }
                self.hilo_valid = rs2 != 0;
            }
            Mfhi => self.write_gpr(rd, self.arch.hi),
            Mflo => self.write_gpr(rd, self.arch.lo),
            Mthi => {
                self.arch.hi = rs1;
                self.hilo_valid = true;
            }
            Mtlo => {
                self.arch.lo = rs1;
                self.hilo_valid = true;
            }
            Addi => match (rs1 as i32).checked_add(imm as i32) {
                Some(v) => self.write_gpr(rd, v as u32),
                None => return Err(Exception::Ov),
            },
            Addui => self.write_gpr(rd, rs1.wrapping_add(imm)),
            Slti => self.write_gpr(rd, ((rs1 as i32) < (imm as i32)) as u32),
            Sltiu => self.write_gpr(rd, (rs1 < imm) as u32),
            Lb => {
                let addr = rs1.wrapping_add(imm);
                let v = self.mem_read(bus, addr, 1)?;
                self.write_gpr(rd, decode::sext(v, 7));
            }
            Lbu => {
                let addr = rs1.wrapping_add(imm);
                let v = self.mem_read(bus, addr, 1)?;
                self.write_gpr(rd, v & 0xFF);
            }
            Lh => {
                let addr = rs1.wrapping_add(imm);
                if addr & 0x1 != 0 {
                    return Err(Exception::AdEL(addr));
                }
                let v = self.mem_read(bus, addr, 2)?;
                self.write_gpr(rd, decode::sext(v, 15));
            }
            Lhu => {
                let addr = rs1.wrapping_add(imm);
                if addr & 0x1 != 0 {
                    return Err(Exception::AdEL(addr));
                }
                let v = self.mem_read(bus, addr, 2)?;
                self.write_gpr(rd, v & 0xFFFF);
            }
            Lw => {
                let addr = rs1.wrapping_add(imm);
                if addr & 0x3 != 0 {
                    return Err(Exception::AdEL(addr));
                }
                let v = self.mem_read(bus, addr, 4)?;
                self.write_gpr(rd, v);
            }
            Ll => {
                let addr = rs1.wrapping_add(imm);
                if addr & 0x3 != 0 {
                    return Err(Exception::AdEL(addr));
                }
                let v = self.mem_read(bus, addr, 4)?;
                self.write_gpr(rd, v);
                self.arch.ll_bit = true;
            }
            Lwl => {
                let addr = rs1.wrapping_add(imm);
                let aligned = addr & !0x3;
                let word = self.mem_read(bus, aligned, 4)?;
                let reg = self.arch.read_gpr(rd);
                self.write_gpr(rd, merge_lwl(word, reg, addr));
            }
            Lwr => {
                let addr = rs1.wrapping_add(imm);
                let aligned = addr & !0x3;
                let word = self.mem_read(bus, aligned, 4)?;
                let reg = self.arch.read_gpr(rd);
                self.write_gpr(rd, merge_lwr(word, reg, addr));
            }
            Sb => {
                let addr = rs1.wrapping_add(imm);
                let value = self.arch.read_gpr(rd);
                self.mem_write(bus, addr, 1, 1 << (addr & 0x3), value)?;
            }
            Sh => {
                let addr = rs1.wrapping_add(imm);
                if addr & 0x1 != 0 {
                    return Err(Exception::AdES(addr));
                }
                let value = self.arch.read_gpr(rd);
                self.mem_write(bus, addr, 2, 0x3 << (addr & 0x2), value)?;
            }
            Sw => {
                let addr = rs1.wrapping_add(imm);
                if addr & 0x3 != 0 {
                    return Err(Exception::AdES(addr));
                }
                let value = self.arch.read_gpr(rd);
                self.mem_write(bus, addr, 4, 0xF, value)?;
            }
            Sc => {
                let addr = rs1.wrapping_add(imm);
                if self.arch.ll_bit {
                    if addr & 0x3 != 0 {
                        return Err(Exception::AdES(addr));
                    }
                    let value = self.arch.read_gpr(rd);
                    self.mem_write(bus, addr, 4, 0xF, value)?;
                    self.arch.ll_bit = false;
                    self.write_gpr(rd, 1);
                } else {
                    self.write_gpr(rd, 0);
                }
            }
            Swl => {
                let addr = rs1.wrapping_add(imm);
                let aligned = addr & !0x3;
                let value = self.arch.read_gpr(rd);
                self.mem_write(bus, aligned, 4, swl_write_enable(addr), value)?;
            }
            Swr => {
                let addr = rs1.wrapping_add(imm);
                let aligned = addr & !0x3;
                let value = self.arch.read_gpr(rd);
                self.mem_write(bus, aligned, 4, swr_write_enable(addr), value)?;
            }
            Andi => self.write_gpr(rd, rs1 & imm),
            Ori => self.write_gpr(rd, rs1 | imm),
            Xori => self.write_gpr(rd, rs1 ^ imm),
            Lui => self.write_gpr(rd, imm << 16),
            Mfc0 => {
                let cp0_reg = decode::bits(raw, 15, 11);
                let sel = decode::bits(raw, 2, 0);
                self.write_gpr(rd, self.arch.cp0.read_reg(cp0_reg, sel));
            }
            Mtc0 => {
                let cp0_reg = decode::bits(raw, 15, 11);
                let sel = decode::bits(raw, 2, 0);
                let value = self.arch.read_gpr(rd);
                self.arch.cp0.write_reg(cp0_reg, sel, value);
            }
            Break => return Err(Exception::Bp),
            Syscall => return Err(Exception::Sys),
            Sdbbp => return Err(Exception::Bp),
            Eret => {
                let target = self.arch.cp0.eret();
                self.arch.ll_bit = false;
                return Ok(ExecResult::Direct(target));
            }
            Beq => {
                if rs1 == rs2 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Bne => {
                if rs1 != rs2 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Bltz => {
                if (rs1 as i32) < 0 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Bgez => {
                if (rs1 as i32) >= 0 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Bgtz => {
                if (rs1 as i32) > 0 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Blez => {
                if (rs1 as i32) <= 0 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Bltzal => {
                self.write_gpr(31, snpc.wrapping_add(4));
                self.inst.flag.call = true;
                if (rs1 as i32) < 0 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            Bgezal => {
                self.write_gpr(31, snpc.wrapping_add(4));
                self.inst.flag.call = true;
                if (rs1 as i32) >= 0 {
                    return Ok(ExecResult::Branch(snpc.wrapping_add(imm)));
                }
            }
            J => return Ok(ExecResult::Branch((this_pc & 0xF000_0000) | imm)),
            Jal => {
                self.write_gpr(31, snpc.wrapping_add(4));
                self.inst.flag.call = true;
                return Ok(ExecResult::Branch((this_pc & 0xF000_0000) | imm));
            }
            Jr => {
                let rs_idx = decode::bits(raw, 25, 21);
                if rs_idx == 31 {
                    self.inst.flag.ret = true;
                }
                return Ok(ExecResult::Branch(rs1));
            }
            Jalr => {
                self.write_gpr(rd, snpc.wrapping_add(4));
                self.inst.flag.call = true;
                return Ok(ExecResult::Branch(rs1));
            }
            Jrhb => return Ok(ExecResult::Branch(rs1)),
            Mul => {
                let v = (rs1 as i32).wrapping_mul(rs2 as i32) as u32;
                self.write_gpr(rd, v);
                self.hilo_valid = false;
            }
            Movn => {
                if rs2 != 0 {
                    self.write_gpr(rd, rs1);
                }
            }
            Movz => {
                if rs2 == 0 {
                    self.write_gpr(rd, rs1);
                }
            }
            Cache | Sync | Pref => {}
            Tlbp => self.arch.cp0.tlbp(),
            Tlbr => self.arch.cp0.tlbr(),
            Tlbwi => self.arch.cp0.tlbwi(),
            Tlbwr => self.arch.cp0.tlbwr(),
            Tne => {
                if rs1 != rs2 {
                    return Err(Exception::Tr);
                }
            }
            Clz => self.write_gpr(rd, rs1.leading_zeros()),
            Madd => {
                let prod = (rs1 as i32 as i64).wrapping_mul(rs2 as i32 as i64);
                let acc = (((self.arch.hi as u64) << 32) | self.arch.lo as u64) as i64;
                let sum = acc.wrapping_add(prod) as u64;
                self.arch.lo = sum as u32;
                self.arch.hi = (sum >> 32) as u32;
                self.hilo_valid = true;
            }
            Ri | CpUnusable | Inv => {
                return Err(if matches!(op, CpUnusable) {
                    Exception::CpU
                } else {
                    Exception::Ri
                });
            }
        }

        Ok(ExecResult::Next)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Big-endian-style merge: `4 - byte` bytes from the top of the aligned
/// word replace the matching top bytes of `reg` (`byte == 0` loads the
/// whole word, `byte == 3` loads only the high byte).
fn merge_lwl(word: u32, reg: u32, addr: u32) -> u32 {
    let byte = (addr & 0x3) as usize;
    let nbytes = 4 - byte;
    let word_be = word.to_be_bytes();
    let mut reg_be = reg.to_be_bytes();
    reg_be[..nbytes].copy_from_slice(&word_be[..nbytes]);
    u32::from_be_bytes(reg_be)
}

/// Complementary merge: `byte + 1` bytes from the bottom of the aligned
/// word replace the matching low bytes of `reg` (`byte == 3` loads the
/// whole word, `byte == 0` loads only the low byte).
fn merge_lwr(word: u32, reg: u32, addr: u32) -> u32 {
    let byte = (addr & 0x3) as usize;
    let start = 3 - byte;
    let word_be = word.to_be_bytes();
    let mut reg_be = reg.to_be_bytes();
    reg_be[start..].copy_from_slice(&word_be[start..]);
    u32::from_be_bytes(reg_be)
}

/// Mirrors `merge_lwl`: the top `4 - byte` big-endian-view bytes map to
/// little-endian byte-enable bits `3 - be_idx`.
fn swl_write_enable(addr: u32) -> u8 {
    let byte = addr & 0x3;
    let mut en = 0u8;
    for be_idx in 0..(4 - byte) {
        en |= 1 << (3 - be_idx);
    }
    en as u8
}

/// Mirrors `merge_lwr`: the bottom `byte + 1` big-endian-view bytes map to
/// little-endian byte-enable bits `3 - be_idx`.
fn swr_write_enable(addr: u32) -> u8 {
    let byte = addr & 0x3;
    let mut en = 0u8;
    for be_idx in (3 - byte)..4 {
        en |= 1 << (3 - be_idx);
    }
    en as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{AddrRange, Device};

    struct Ram(Vec<u8>);
    impl Device for Ram {
        fn read8(&self, offset: u32) -> u8 {
            self.0.get(offset as usize).copied().unwrap_or(0)
        }
        fn write8(&mut self, offset: u32, value: u8) {
            if let Some(b) = self.0.get_mut(offset as usize) {
                *b = value;
            }
        }
        fn reset(&mut self) {
            self.0.iter_mut().for_each(|b| *b = 0);
        }
    }

    fn bus_with_image(words: &[u32]) -> PaddrBus {
        let mut bytes = Vec::new();
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes.resize(0x1000, 0);
        let mut bus = PaddrBus::new();
        bus.add_device(AddrRange::new(0xBFC0_0000, 0xFFF), "boot", Box::new(Ram(bytes)))
            .unwrap();
        bus
    }

    #[test]
    fn addi_then_add_retires_through_reset_vector() {
        // addi $1, $0, 5 ; addi $2, $0, 7 ; add $3, $1, $2
        let mut bus = bus_with_image(&[0x2001_0005, 0x2002_0007, 0x0022_1820]);
        let mut cpu = Interpreter::new();
        cpu.step(&mut bus, false);
        cpu.step(&mut bus, false);
        let out = cpu.step(&mut bus, false);
        assert!(out.exception.is_none());
        assert_eq!(cpu.arch.read_gpr(3), 12);
    }

    #[test]
    fn add_overflow_raises_ov_and_vectors_to_general_vector() {
        // lui $1,0x7fff ; ori $1,$1,0xffff ($1 = i32::MAX) ; addi $2,$0,1 ; add $3,$1,$2
        let mut bus = bus_with_image(&[0x3c01_7fff, 0x3421_ffff, 0x2002_0001, 0x0022_1820]);
        let mut cpu = Interpreter::new();
        cpu.step(&mut bus, false);
        cpu.step(&mut bus, false);
        cpu.step(&mut bus, false);
        let out = cpu.step(&mut bus, false);
        assert_eq!(out.exception, Some(Exception::Ov));
        assert_eq!(cpu.arch.pc, super::super::cp0::GENERAL_VECTOR);
    }

    #[test]
    fn branch_takes_effect_after_delay_slot() {
        // beq $0,$0,1 ; addi $1,$0,9 (delay slot) ; addi $2,$0,1 (skipped target)
        let mut bus = bus_with_image(&[0x1000_0001, 0x2001_0009, 0x2002_0001]);
        let mut cpu = Interpreter::new();
        let first = cpu.step(&mut bus, false);
        assert_eq!(first.next_pc, 0xBFC0_0004); // delay slot still executes in order
        cpu.step(&mut bus, false); // delay slot: addi $1,$0,9
        assert_eq!(cpu.arch.read_gpr(1), 9);
        assert_eq!(cpu.arch.pc, 0xBFC0_0008); // target = snpc(of beq) + 1*4
    }

    #[test]
    fn unaligned_word_load_raises_adel() {
        let mut bus = bus_with_image(&[0x8c01_0001]); // lw $1, 1($0)
        let mut cpu = Interpreter::new();
        let out = cpu.step(&mut bus, false);
        assert_eq!(out.exception, Some(Exception::AdEL(1)));
    }

    #[test]
    fn lwl_at_byte_zero_and_lwr_at_byte_three_each_load_the_full_word() {
        let word = 0xDEAD_BEEFu32;
        assert_eq!(merge_lwl(word, 0, 0x0), word);
        assert_eq!(merge_lwr(word, 0, 0x3), word);
    }

    #[test]
    fn lwl_at_byte_three_merges_only_the_high_byte() {
        let word = 0xDEAD_BEEFu32;
        let reg = 0x0000_00AA;
        assert_eq!(merge_lwl(word, reg, 0x3), 0xDE00_00AA);
    }

    #[test]
    fn jal_links_return_address_and_sets_call_flag() {
        let mut bus = bus_with_image(&[0x0c00_0002]); // jal 0x8
        let mut cpu = Interpreter::new();
        let out = cpu.step(&mut bus, false);
        assert!(out.flag.call);
        assert_eq!(cpu.arch.read_gpr(31), 0xBFC0_0008);
    }

    #[test]
    fn mult_sets_hi_lo() {
        let mut bus = bus_with_image(&[0x0022_0018, 0, 0]); // mult $1,$2
        let mut cpu = Interpreter::new();
        cpu.arch.write_gpr(1, 6);
        cpu.arch.write_gpr(2, 7);
        cpu.step(&mut bus, false);
        assert_eq!(cpu.arch.lo, 42);
        assert_eq!(cpu.arch.hi, 0);
    }
}
