//! at32flash-core - Embedded flash driver for Artery AT32F4xx microcontrollers
//!
//! This crate programs the on-chip flash of AT32F4xx parts through a debug
//! target connection. It identifies the connected chip from its product ID,
//! derives the bank geometry (regions, sectors and write-protection blocks)
//! and drives the Embedded Flash Controller (EFC) through its
//! unlock/operate/poll/relock sequences.
//!
//! The debug connection itself is not part of this crate. Anything that can
//! read and write target memory and run a small on-target routine implements
//! the [`target::Target`] trait and can be handed to a [`bank::FlashBank`].
//!
//! # Features
//!
//! - `std` - Enable standard library support, including the TOML bank file
//!   loader in [`config`]
//!
//! # Example
//!
//! ```ignore
//! use at32flash_core::{bank::FlashBank, config::BankConfig};
//!
//! fn flash_image<T: Target>(target: &mut T, image: &[u8]) -> at32flash_core::Result<()> {
//!     let config = BankConfig::from_args(&["0x08000000", "0", "0", "0", "0"])?;
//!     let mut bank = FlashBank::new(config);
//!     bank.probe(target)?;
//!     let last = bank.sectors().len() as u32 - 1;
//!     bank.erase(target, 0, last)?;
//!     bank.write(target, image, 0)
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

pub mod bank;
pub mod block_write;
pub mod chip;
pub mod config;
pub mod efc;
pub mod error;
pub mod geometry;
pub mod spim;
pub mod target;
pub mod usd;

pub use error::{Error, Result};
