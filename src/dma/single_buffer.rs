//! Single-buffered or peripheral-peripheral DMA Transfers

use core::sync::atomic::{compiler_fence, Ordering};

use super::{
    AddressMode, ChannelConfig, Event, ReadTarget, SingleChannel, TransferWidth, WriteTarget,
    MAX_BLOCK_SIZE,
};
use crate::aos::{Aos, EventSource};
use crate::error::{Error, Result};

/// Configuration for single-buffered DMA transfer
pub struct Config<CH: SingleChannel, FROM: ReadTarget, TO: WriteTarget> {
    ch: CH,
    from: FROM,
    to: TO,
}

impl<CH, FROM, TO, WORD> Config<CH, FROM, TO>
where
    CH: SingleChannel,
    FROM: ReadTarget<ReceivedWord = WORD>,
    TO: WriteTarget<TransmittedWord = WORD>,
{
    /// Create a new configuration for single-buffered DMA transfer
    pub fn new(ch: CH, from: FROM, to: TO) -> Config<CH, FROM, TO> {
        Config { ch, from, to }
    }

    /// Start the DMA transfer
    ///
    /// Memory to memory copies run as one block started by the software
    /// event. When either side is a peripheral, its event paces the transfer
    /// one data unit at a time.
    pub fn start(mut self, aos: &mut Aos) -> Result<Transfer<CH, FROM, TO>> {
        let (config, trigger) = transfer_config::<WORD, FROM, TO>(&self.from, &mut self.to)?;

        // Make sure that memory contents reflect what the user intended.
        compiler_fence(Ordering::SeqCst);

        self.ch.init(&config)?;
        self.ch.set_trigger(aos, trigger)?;
        self.ch.enable();
        if trigger == EventSource::Software {
            aos.software_trigger();
        }

        Ok(Transfer {
            ch: self.ch,
            from: self.from,
            to: self.to,
        })
    }
}

fn transfer_config<WORD, FROM, TO>(from: &FROM, to: &mut TO) -> Result<(ChannelConfig, EventSource)>
where
    FROM: ReadTarget<ReceivedWord = WORD>,
    TO: WriteTarget<TransmittedWord = WORD>,
{
    let width = TransferWidth::of::<WORD>()?;
    let (src_addr, src_count) = from.rx_address_count();
    let (dst_addr, dst_count) = to.tx_address_count();
    let len = src_count.min(dst_count);
    if len == 0 {
        return Err(Error::InvalidParameter);
    }

    let mode = |inc: bool| {
        if inc {
            AddressMode::Increment
        } else {
            AddressMode::Fixed
        }
    };
    let mut config = ChannelConfig {
        src_addr,
        dst_addr,
        width,
        src_mode: mode(from.rx_increment()),
        dst_mode: mode(to.tx_increment()),
        ..Default::default()
    };

    let trigger = match FROM::rx_treq().or(TO::tx_treq()) {
        Some(event) => {
            config.block_size = 1;
            config.transfer_count = u16::try_from(len).map_err(|_| Error::InvalidParameter)?;
            event
        }
        None => {
            if len > MAX_BLOCK_SIZE as u32 {
                return Err(Error::InvalidParameter);
            }
            config.block_size = len as u16;
            config.transfer_count = 1;
            EventSource::Software
        }
    };
    Ok((config, trigger))
}

/// Instance of a single-buffered DMA transfer
pub struct Transfer<CH: SingleChannel, FROM: ReadTarget, TO: WriteTarget> {
    ch: CH,
    from: FROM,
    to: TO,
}

impl<CH, FROM, TO, WORD> Transfer<CH, FROM, TO>
where
    CH: SingleChannel,
    FROM: ReadTarget<ReceivedWord = WORD>,
    TO: WriteTarget<TransmittedWord = WORD>,
{
    /// Check if an interrupt is pending for this channel
    /// and clear the corresponding pending bit
    pub fn check_tc_irq(&mut self) -> bool {
        self.ch.check_tc_irq()
    }

    /// Check if an interrupt is pending for this channel
    /// and clear the corresponding pending bit
    pub fn check_err_irq(&mut self) -> bool {
        self.ch.check_err_irq()
    }

    pub fn is_done(&self) -> bool {
        self.ch.is_flag(Event::TransferComplete)
    }

    /// Block until the transfer is complete, returning the channel and targets
    pub fn wait(mut self) -> (CH, FROM, TO) {
        while !self.is_done() {
            core::hint::spin_loop();
        }
        self.ch.clear_flag(Event::TransferComplete);
        self.ch.disable();

        // Make sure that memory contents reflect what the user intended.
        compiler_fence(Ordering::SeqCst);

        (self.ch, self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::{DMAExt, Dma};
    use crate::pac::{self, testing, Readable, Writeable};

    fn setup() -> (
        crate::dma::Channels,
        &'static pac::dma::RegisterBlock,
        Aos,
        &'static pac::aos::RegisterBlock,
    ) {
        let (dma, dma_rb) = testing::block::<pac::dma::RegisterBlock>();
        let (aos, aos_rb) = testing::block::<pac::aos::RegisterBlock>();
        (Dma::new(dma).split(), dma_rb, Aos::new(aos), aos_rb)
    }

    #[test]
    fn memory_copy_is_one_software_block() {
        let (chs, dma_rb, mut aos, aos_rb) = setup();
        let src: &'static [u32; 8] = Box::leak(Box::new([7; 8]));
        let dst: &'static mut [u32; 8] = Box::leak(Box::new([0; 8]));
        let src_addr = src.as_ptr() as u32;

        let transfer = Config::new(chs.ch1, src, dst).start(&mut aos).unwrap();
        let ch = &dma_rb.ch[1];
        assert_eq!(ch.sar.get(), src_addr);
        assert_eq!(ch.dtctl.get(), 1 << 16 | 8);
        assert_eq!(dma_rb.chen.get(), 1 << 1);
        assert_eq!(aos_rb.dma_trgsel[1].get(), EventSource::Software.number() as u32);
        assert_eq!(aos_rb.intsfttrg.get(), 1);
        assert!(!transfer.is_done());

        dma_rb.intstat1.set(1 << 1);
        let (ch1, _, _) = transfer.wait();
        assert!(!ch1.is_enabled());
        assert_eq!(dma_rb.intclr1.get(), 1 << 1);
    }

    #[test]
    fn mismatched_lengths_use_the_shorter() {
        let (chs, dma_rb, mut aos, _) = setup();
        let src: &'static [u8; 4] = Box::leak(Box::new([1; 4]));
        let dst: &'static mut [u8; 16] = Box::leak(Box::new([0; 16]));
        let _transfer = Config::new(chs.ch0, src, dst).start(&mut aos).unwrap();
        assert_eq!(dma_rb.ch[0].dtctl.get(), 1 << 16 | 4);
    }

    #[test]
    fn oversized_memory_copy_is_rejected() {
        let (chs, dma_rb, mut aos, _) = setup();
        let src: &'static [u8; 2048] = Box::leak(Box::new([1; 2048]));
        let dst: &'static mut [u8; 2048] = Box::leak(Box::new([0; 2048]));
        assert!(Config::new(chs.ch2, src, dst).start(&mut aos).is_err());
        assert_eq!(dma_rb.chen.get(), 0);
    }
}
