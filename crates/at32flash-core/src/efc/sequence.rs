//! Unlock / operate / poll / relock sequences
//!
//! Every mutating controller operation runs between an unlock handshake and
//! a final write of `OPLK` to EFC_CTRL. The scoped helpers
//! [`Efc::with_unlocked`] and [`Efc::with_usd_unlocked`] run the body and
//! then relock on every exit path. The first error wins; a relock failure is
//! only returned when the body succeeded.
//!
//! Operation bits and the start bit (`ERSTR`) are always written to
//! EFC_CTRL in two separate writes. The controller does not start an erase
//! when both arrive in a single write.

use log::{debug, error};

use super::regs::{
    Ctrl, Status, EFC_ADDR, EFC_UNLOCK, EFC_USD_UNLOCK, KEY1, KEY2, MASS_ERASE_TIMEOUT,
    SECTOR_ERASE_TIMEOUT, WRITE_TIMEOUT,
};
use super::Efc;
use crate::error::{Error, Result};
use crate::target::Target;

impl Efc {
    /// Unlock the flash controller for erase and program
    pub fn unlock<T: Target + ?Sized>(&self, target: &mut T) -> Result<()> {
        self.write_reg(target, EFC_UNLOCK, KEY1)?;
        self.write_reg(target, EFC_UNLOCK, KEY2)
    }

    /// Unlock user system data programming
    ///
    /// Needs the flash controller unlocked first.
    pub fn usd_unlock<T: Target + ?Sized>(&self, target: &mut T) -> Result<()> {
        self.write_reg(target, EFC_USD_UNLOCK, KEY1)?;
        self.write_reg(target, EFC_USD_UNLOCK, KEY2)
    }

    /// Set the operation lock
    pub fn lock<T: Target + ?Sized>(&self, target: &mut T) -> Result<()> {
        self.set_ctrl(target, Ctrl::OPLK)
    }

    /// Run `f` with the controller unlocked, then relock
    pub fn with_unlocked<T, R, F>(&self, target: &mut T, f: F) -> Result<R>
    where
        T: Target + ?Sized,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let result = self.unlock(target).and_then(|()| f(target));
        self.relock(target, result)
    }

    /// Run `f` with both the controller and option bytes unlocked, then relock
    pub fn with_usd_unlocked<T, R, F>(&self, target: &mut T, f: F) -> Result<R>
    where
        T: Target + ?Sized,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let result = self
            .unlock(target)
            .and_then(|()| self.usd_unlock(target))
            .and_then(|()| f(target));
        self.relock(target, result)
    }

    fn relock<T: Target + ?Sized, R>(&self, target: &mut T, result: Result<R>) -> Result<R> {
        match (result, self.lock(target)) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => {
                error!("{}: failed to relock flash controller: {}", self.chip(), e);
                Err(e)
            }
            (Err(e), Err(lock_err)) => {
                error!(
                    "{}: failed to relock flash controller: {}",
                    self.chip(),
                    lock_err
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    /// Poll EFC_STS until the busy flag clears
    ///
    /// `timeout` counts 1 ms polls. Programming and protection errors are
    /// cleared in hardware and reported as [`Error::Hardware`].
    pub fn wait_busy<T: Target + ?Sized>(&self, target: &mut T, timeout: u32) -> Result<Status> {
        let mut remaining = timeout;

        let status = loop {
            let status = self.status(target)?;
            debug!("EFC status: 0x{:08X}", status.bits());
            if !status.contains(Status::OBF) {
                break status;
            }
            if remaining == 0 {
                error!("{}: timed out waiting for flash", self.chip());
                return Err(Error::Timeout);
            }
            remaining -= 1;
            target.delay_ms(1);
        };

        let errors = status & Status::ERRORS;
        if !errors.is_empty() {
            error!(
                "{} device programming failed: {}",
                self.chip(),
                Error::Hardware(errors)
            );
            self.clear_status(target, Status::ERRORS)?;
            return Err(Error::Hardware(errors));
        }

        Ok(status)
    }

    /// Erase the sector containing `address`
    ///
    /// The controller must already be unlocked.
    pub fn erase_sector<T: Target + ?Sized>(&self, target: &mut T, address: u32) -> Result<()> {
        self.set_ctrl(target, Ctrl::SECERS)?;
        self.write_reg(target, EFC_ADDR, address)?;
        self.set_ctrl(target, Ctrl::SECERS | Ctrl::ERSTR)?;
        self.wait_busy(target, SECTOR_ERASE_TIMEOUT).map(drop)
    }

    /// Erase every sector controlled by this register block
    pub fn erase_region<T: Target + ?Sized>(&self, target: &mut T) -> Result<()> {
        self.with_unlocked(target, |t| {
            self.set_ctrl(t, Ctrl::BANKERS)?;
            self.set_ctrl(t, Ctrl::BANKERS | Ctrl::ERSTR)?;
            self.wait_busy(t, MASS_ERASE_TIMEOUT).map(drop)
        })
    }

    /// Erase the option-byte area
    pub fn erase_usd<T: Target + ?Sized>(&self, target: &mut T) -> Result<()> {
        self.with_usd_unlocked(target, |t| {
            let op = Ctrl::USDERS | Ctrl::USDULKS;
            self.set_ctrl(t, op)?;
            self.set_ctrl(t, op | Ctrl::ERSTR)?;
            self.wait_busy(t, SECTOR_ERASE_TIMEOUT).map(drop)
        })
    }

    /// Program one half-word directly from the host
    ///
    /// The matching program bit must already be set in EFC_CTRL.
    pub fn program_halfword<T: Target + ?Sized>(
        &self,
        target: &mut T,
        address: u32,
        value: u16,
    ) -> Result<()> {
        target.write_u16(address, value)?;
        self.wait_busy(target, WRITE_TIMEOUT).map(drop)
    }
}
