//! Register model of one EFC block

use at32flash_core::efc::regs::{KEY1, KEY2};
use at32flash_core::efc::{Ctrl, Status};
use log::debug;

/// Progress of a two-key unlock handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handshake {
    Locked,
    FirstKey,
    Unlocked,
}

impl Handshake {
    fn feed(self, value: u32) -> Self {
        match (self, value) {
            (Handshake::Locked, KEY1) => Handshake::FirstKey,
            (Handshake::FirstKey, KEY2) => Handshake::Unlocked,
            (Handshake::Unlocked, _) => Handshake::Unlocked,
            _ => Handshake::Locked,
        }
    }
}

/// Operation requested by a start bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    SectorErase(u32),
    BankErase,
    UsdErase,
}

const OP_SELECT: u32 = Ctrl::SECERS.bits() | Ctrl::BANKERS.bits() | Ctrl::USDERS.bits();

#[derive(Debug, Clone)]
pub(crate) struct Controller {
    pub base: u32,
    flash: Handshake,
    usd: Handshake,
    pub ctrl: u32,
    pub addr: u32,
    pub sts: u32,
    busy_left: u32,
}

impl Controller {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            flash: Handshake::Locked,
            usd: Handshake::Locked,
            ctrl: Ctrl::OPLK.bits(),
            addr: 0,
            sts: 0,
            busy_left: 0,
        }
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && address < self.base + 0x40
    }

    pub fn is_unlocked(&self) -> bool {
        self.flash == Handshake::Unlocked
    }

    pub fn is_usd_unlocked(&self) -> bool {
        self.is_unlocked() && self.usd == Handshake::Unlocked
    }

    pub fn can_program(&self) -> bool {
        self.is_unlocked() && self.ctrl & Ctrl::FPRGM.bits() != 0
    }

    pub fn can_program_usd(&self) -> bool {
        self.is_usd_unlocked() && self.ctrl & Ctrl::USDPRGM.bits() != 0
    }

    pub fn write_unlock(&mut self, value: u32) {
        self.flash = self.flash.feed(value);
        if self.is_unlocked() {
            self.ctrl &= !Ctrl::OPLK.bits();
        }
    }

    pub fn write_usd_unlock(&mut self, value: u32) {
        if !self.is_unlocked() {
            return;
        }
        self.usd = self.usd.feed(value);
        if self.usd == Handshake::Unlocked {
            self.ctrl |= Ctrl::USDULKS.bits();
        }
    }

    /// Handle a write to EFC_CTRL, returning an operation to run
    pub fn write_ctrl(&mut self, value: u32) -> Option<Operation> {
        if !self.is_unlocked() {
            debug!("EFC 0x{:08X}: CTRL write 0x{:X} ignored, locked", self.base, value);
            return None;
        }

        if value & Ctrl::OPLK.bits() != 0 {
            self.lock();
            return None;
        }

        let previous = self.ctrl;
        self.ctrl = value | (previous & Ctrl::USDULKS.bits());

        if value & Ctrl::ERSTR.bits() == 0 {
            return None;
        }

        // the start bit only acts on an operation selected by an earlier write
        let op = value & OP_SELECT;
        if previous & Ctrl::ERSTR.bits() != 0 || previous & OP_SELECT != op {
            debug!("EFC 0x{:08X}: start bit without prior operation select", self.base);
            return None;
        }

        if op == Ctrl::SECERS.bits() {
            Some(Operation::SectorErase(self.addr))
        } else if op == Ctrl::BANKERS.bits() {
            Some(Operation::BankErase)
        } else if op == Ctrl::USDERS.bits() && self.is_usd_unlocked() {
            Some(Operation::UsdErase)
        } else {
            None
        }
    }

    pub fn lock(&mut self) {
        self.flash = Handshake::Locked;
        self.usd = Handshake::Locked;
        self.ctrl = Ctrl::OPLK.bits();
    }

    pub fn clear_status(&mut self, value: u32) {
        let clearable = Status::PRGMERR | Status::EPPERR | Status::ODF;
        self.sts &= !(value & clearable.bits());
    }

    /// Record completion of an operation
    pub fn finish(&mut self, errors: u32, busy_polls: u32) {
        self.sts |= errors | Status::ODF.bits();
        self.busy_left = busy_polls;
    }

    pub fn read_status(&mut self, stuck_busy: bool) -> u32 {
        if stuck_busy {
            return self.sts | Status::OBF.bits();
        }
        if self.busy_left > 0 {
            self.busy_left -= 1;
            return self.sts | Status::OBF.bits();
        }
        self.sts
    }

    pub fn settle(&mut self) {
        self.busy_left = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlocked() -> Controller {
        let mut c = Controller::new(0x4002_2000);
        c.write_unlock(KEY1);
        c.write_unlock(KEY2);
        c
    }

    #[test]
    fn test_keys_must_arrive_in_order() {
        let mut c = Controller::new(0x4002_2000);
        c.write_unlock(KEY2);
        c.write_unlock(KEY1);
        assert!(!c.is_unlocked());
        assert!(unlocked().is_unlocked());
    }

    #[test]
    fn test_start_with_select_is_ignored() {
        let mut c = unlocked();
        let both = (Ctrl::SECERS | Ctrl::ERSTR).bits();
        assert_eq!(c.write_ctrl(both), None);

        let mut c = unlocked();
        c.addr = 0x0800_0800;
        assert_eq!(c.write_ctrl(Ctrl::SECERS.bits()), None);
        assert_eq!(c.write_ctrl(both), Some(Operation::SectorErase(0x0800_0800)));
    }

    #[test]
    fn test_oplk_relocks() {
        let mut c = unlocked();
        c.write_ctrl(Ctrl::OPLK.bits());
        assert!(!c.is_unlocked());
        assert_eq!(c.write_ctrl(Ctrl::BANKERS.bits()), None);
        assert_eq!(c.ctrl, Ctrl::OPLK.bits());
    }
}
