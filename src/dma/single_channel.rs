use super::{
    block_size_bits, llp_bits, repeat_bits, Channel, ChannelConfig, ChannelIndex, Event,
    LlpDescriptor, LlpMode,
};
use crate::aos::{Aos, EventSource, Target};
use crate::error::Result;
use crate::pac::dma::{ChannelRegisters, RegisterBlock, CHCTL, CHSTAT, DTCTL, INT0, INT1, RPT};
use crate::pac::{ReadWriteable, Readable, Writeable};
use crate::typelevel::Sealed;

/// Trait which implements low-level functionality for transfers using a single DMA channel.
pub trait SingleChannel: Sealed {
    /// Returns the registers shared by all channels.
    fn dma(&self) -> &RegisterBlock;
    /// Returns the index of the DMA channel.
    fn id(&self) -> u8;

    /// Returns the registers associated with this DMA channel.
    fn ch(&self) -> &ChannelRegisters {
        &self.dma().ch[self.id() as usize]
    }

    /// Writes a full channel configuration. The channel is disabled first and
    /// its pending flags are cleared.
    fn init(&mut self, config: &ChannelConfig) -> Result<()> {
        let [sar, dar, dtctl, rpt, llp, chctl] = config.words()?;
        self.disable();
        let ch = self.ch();
        ch.sar.set(sar);
        ch.dar.set(dar);
        ch.dtctl.set(dtctl);
        ch.rpt.set(rpt);
        ch.llp.set(llp);
        ch.chctl.set(chctl);
        for event in [
            Event::TransferComplete,
            Event::BlockComplete,
            Event::TransferError,
            Event::RequestError,
        ] {
            self.clear_flag(event);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("dma ch{}: {}", self.id(), config);
        Ok(())
    }

    /// Loads a descriptor into the channel registers as the first link of a
    /// chain.
    fn init_from(&mut self, desc: &LlpDescriptor) {
        self.disable();
        let ch = self.ch();
        ch.sar.set(desc.sar);
        ch.dar.set(desc.dar);
        ch.dtctl.set(desc.dtctl);
        ch.rpt.set(desc.rpt);
        ch.llp.set(desc.llp);
        ch.chctl.set(desc.chctl);
    }

    /// Restores the channel registers to their reset state.
    fn deinit(&mut self) {
        self.disable();
        let ch = self.ch();
        ch.sar.set(0);
        ch.dar.set(0);
        ch.dtctl.set(0);
        ch.rpt.set(0);
        ch.llp.set(0);
        ch.chctl.set(0);
        for event in [
            Event::TransferComplete,
            Event::BlockComplete,
            Event::TransferError,
            Event::RequestError,
        ] {
            self.unlisten(event);
            self.clear_flag(event);
        }
    }

    fn enable(&mut self) {
        let chen = &self.dma().chen;
        chen.set(chen.get() | 1 << self.id());
    }

    fn disable(&mut self) {
        let chen = &self.dma().chen;
        chen.set(chen.get() & !(1 << self.id()));
    }

    fn is_enabled(&self) -> bool {
        self.dma().chen.get() & (1 << self.id()) != 0
    }

    /// True while the channel is moving data.
    fn is_active(&self) -> bool {
        self.dma().chstat.read(CHSTAT::CHACT) & (1 << self.id()) != 0
    }

    fn set_src_addr(&mut self, addr: u32) {
        self.ch().sar.set(addr);
    }

    fn set_dst_addr(&mut self, addr: u32) {
        self.ch().dar.set(addr);
    }

    /// Current source address, advanced by the hardware while transferring.
    fn src_addr(&self) -> u32 {
        self.ch().sar.get()
    }

    fn dst_addr(&self) -> u32 {
        self.ch().dar.get()
    }

    fn set_block_size(&mut self, block_size: u16) -> Result<()> {
        let bits = block_size_bits(block_size)?;
        self.ch().dtctl.modify(DTCTL::BLKSIZE.val(bits));
        Ok(())
    }

    fn set_transfer_count(&mut self, count: u16) {
        self.ch().dtctl.modify(DTCTL::CNT.val(count as u32));
    }

    /// Get the number of blocks that (still) need to be transferred.
    fn remaining_transfers(&self) -> u16 {
        self.ch().dtctl.read(DTCTL::CNT) as u16
    }

    fn set_src_repeat(&mut self, repeat: Option<u16>) -> Result<()> {
        let (enable, size) = repeat_bits(repeat)?;
        self.ch().rpt.modify(RPT::SRPT.val(size));
        self.ch().chctl.modify(CHCTL::SRPTEN.val(enable as u32));
        Ok(())
    }

    fn set_dst_repeat(&mut self, repeat: Option<u16>) -> Result<()> {
        let (enable, size) = repeat_bits(repeat)?;
        self.ch().rpt.modify(RPT::DRPT.val(size));
        self.ch().chctl.modify(CHCTL::DRPTEN.val(enable as u32));
        Ok(())
    }

    /// Continues with `next` when the current configuration completes.
    fn set_llp(&mut self, next: &'static LlpDescriptor, mode: LlpMode) {
        // a descriptor is always word aligned
        let _ = unsafe { self.set_llp_addr(next.address(), mode) };
    }

    /// Continues with the descriptor at `addr` when the current configuration
    /// completes.
    ///
    /// # Safety
    ///
    /// `addr` must point at an [`LlpDescriptor`] that stays valid until the
    /// channel has loaded it.
    unsafe fn set_llp_addr(&mut self, addr: u32, mode: LlpMode) -> Result<()> {
        let addr = llp_bits(addr)?;
        self.ch().llp.set(addr);
        self.ch().chctl.modify(
            CHCTL::LLPEN::SET + CHCTL::LLPRUN.val((mode == LlpMode::RunImmediately) as u32),
        );
        Ok(())
    }

    /// Ends the chain after the current configuration.
    fn disable_llp(&mut self) {
        self.ch().chctl.modify(CHCTL::LLPEN::CLEAR);
    }

    /// Selects the event that requests one block.
    fn set_trigger(&mut self, aos: &mut Aos, source: EventSource) -> Result<()> {
        aos.set_trigger(Target::Dma(self.id()), source)
    }

    /// Requests one block from software. The channel's trigger is routed to
    /// [`EventSource::Software`] and the shared software event is raised, so
    /// every other consumer routed to it fires too.
    fn software_trigger(&mut self, aos: &mut Aos) -> Result<()> {
        self.set_trigger(aos, EventSource::Software)?;
        aos.software_trigger();
        Ok(())
    }

    /// Enables the interrupt for `event`.
    fn listen(&mut self, event: Event) {
        let dma = self.dma();
        let bit = 1 << self.id();
        match event {
            Event::TransferComplete => {
                dma.intmask1.modify(INT1::TC.val(dma.intmask1.read(INT1::TC) & !bit))
            }
            Event::BlockComplete => {
                dma.intmask1.modify(INT1::BTC.val(dma.intmask1.read(INT1::BTC) & !bit))
            }
            Event::TransferError => {
                dma.intmask0.modify(INT0::TRNERR.val(dma.intmask0.read(INT0::TRNERR) & !bit))
            }
            Event::RequestError => {
                dma.intmask0.modify(INT0::REQERR.val(dma.intmask0.read(INT0::REQERR) & !bit))
            }
        }
        self.ch().chctl.modify(CHCTL::IE::SET);
    }

    /// Masks the interrupt for `event`.
    fn unlisten(&mut self, event: Event) {
        let dma = self.dma();
        let bit = 1 << self.id();
        match event {
            Event::TransferComplete => {
                dma.intmask1.modify(INT1::TC.val(dma.intmask1.read(INT1::TC) | bit))
            }
            Event::BlockComplete => {
                dma.intmask1.modify(INT1::BTC.val(dma.intmask1.read(INT1::BTC) | bit))
            }
            Event::TransferError => {
                dma.intmask0.modify(INT0::TRNERR.val(dma.intmask0.read(INT0::TRNERR) | bit))
            }
            Event::RequestError => {
                dma.intmask0.modify(INT0::REQERR.val(dma.intmask0.read(INT0::REQERR) | bit))
            }
        }
    }

    fn is_flag(&self, event: Event) -> bool {
        let dma = self.dma();
        let status = match event {
            Event::TransferComplete => dma.intstat1.read(INT1::TC),
            Event::BlockComplete => dma.intstat1.read(INT1::BTC),
            Event::TransferError => dma.intstat0.read(INT0::TRNERR),
            Event::RequestError => dma.intstat0.read(INT0::REQERR),
        };
        status & (1 << self.id()) != 0
    }

    /// Clears the flag of `event`. The clear registers are write-1-to-clear.
    fn clear_flag(&mut self, event: Event) {
        let dma = self.dma();
        let bit = 1 << self.id();
        match event {
            Event::TransferComplete => dma.intclr1.write(INT1::TC.val(bit)),
            Event::BlockComplete => dma.intclr1.write(INT1::BTC.val(bit)),
            Event::TransferError => dma.intclr0.write(INT0::TRNERR.val(bit)),
            Event::RequestError => dma.intclr0.write(INT0::REQERR.val(bit)),
        }
    }

    /// Check if an interrupt is pending for this channel
    /// and clear the corresponding pending bit
    fn check_irq(&mut self, event: Event) -> bool {
        if self.is_flag(event) {
            self.clear_flag(event);
            true
        } else {
            false
        }
    }

    /// Check and clear the transfer complete flag.
    fn check_tc_irq(&mut self) -> bool {
        self.check_irq(Event::TransferComplete)
    }

    /// Check and clear the block complete flag.
    fn check_btc_irq(&mut self) -> bool {
        self.check_irq(Event::BlockComplete)
    }

    /// Check and clear both error flags.
    fn check_err_irq(&mut self) -> bool {
        let transfer = self.check_irq(Event::TransferError);
        let request = self.check_irq(Event::RequestError);
        if transfer || request {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "dma ch{}: error (transfer {}, request {})",
                self.id(),
                transfer,
                request
            );
        }
        transfer || request
    }
}

impl<CH: ChannelIndex> SingleChannel for Channel<CH> {
    fn dma(&self) -> &RegisterBlock {
        &self.dma
    }

    fn id(&self) -> u8 {
        CH::id()
    }
}

impl<CH: ChannelIndex> Sealed for Channel<CH> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::{AddressMode, DMAExt, Dma, TransferWidth};
    use crate::pac::testing;

    fn channels() -> (crate::dma::Channels, &'static RegisterBlock) {
        let (regs, rb) = testing::block::<RegisterBlock>();
        (Dma::new(regs).split(), rb)
    }

    #[test]
    fn channels_are_send() {
        use crate::dma::{CH0, CH3};
        testing::assert_send::<Channel<CH0>>();
        testing::assert_send::<Channel<CH3>>();
        testing::assert_send::<crate::dma::Channels>();
    }

    #[test]
    fn init_writes_channel_registers() {
        let (mut chs, rb) = channels();
        let cfg = ChannelConfig {
            src_addr: 0x2000_0000,
            dst_addr: 0x2000_0400,
            block_size: 16,
            transfer_count: 2,
            width: TransferWidth::Bits32,
            src_mode: AddressMode::Increment,
            dst_mode: AddressMode::Increment,
            ..Default::default()
        };
        chs.ch2.enable();
        chs.ch2.init(&cfg).unwrap();
        let ch = &rb.ch[2];
        assert_eq!(ch.sar.get(), 0x2000_0000);
        assert_eq!(ch.dar.get(), 0x2000_0400);
        assert_eq!(ch.dtctl.read(DTCTL::BLKSIZE), 16);
        assert_eq!(ch.dtctl.read(DTCTL::CNT), 2);
        assert_eq!(ch.chctl.read(CHCTL::HSIZE), 2);
        assert!(!ch.chctl.is_set(CHCTL::LLPEN));
        // init leaves the channel disabled and clears its flags
        assert!(!chs.ch2.is_enabled());
        assert_eq!(rb.intclr1.get(), 1 << 18);
        assert_eq!(rb.ch[0].sar.get(), 0);
    }

    #[test]
    fn init_rejects_bad_config_without_touching_registers() {
        let (mut chs, rb) = channels();
        chs.ch1.enable();
        let cfg = ChannelConfig {
            block_size: 2000,
            ..Default::default()
        };
        assert!(chs.ch1.init(&cfg).is_err());
        assert!(chs.ch1.is_enabled());
        assert_eq!(rb.ch[1].dtctl.get(), 0);
    }

    #[test]
    fn enable_bits_are_per_channel() {
        let (mut chs, rb) = channels();
        chs.ch0.enable();
        chs.ch3.enable();
        assert_eq!(rb.chen.get(), 0b1001);
        chs.ch0.disable();
        assert_eq!(rb.chen.get(), 0b1000);
        assert!(chs.ch3.is_enabled());
    }

    #[test]
    fn flags_check_and_clear() {
        let (mut chs, rb) = channels();
        rb.intstat1.set(1 << 1 | 1 << 17);
        assert!(chs.ch1.is_flag(Event::TransferComplete));
        assert!(chs.ch1.is_flag(Event::BlockComplete));
        assert!(!chs.ch0.is_flag(Event::TransferComplete));
        assert!(chs.ch1.check_tc_irq());
        assert_eq!(rb.intclr1.get(), 1 << 1);
        assert!(!chs.ch1.check_err_irq());
    }

    #[test]
    fn listen_unmasks_and_enables_channel_interrupt() {
        let (mut chs, rb) = channels();
        rb.intmask1.set(0x000F_000F);
        chs.ch2.listen(Event::TransferComplete);
        assert_eq!(rb.intmask1.get(), 0x000F_000B);
        assert!(rb.ch[2].chctl.is_set(CHCTL::IE));
        chs.ch2.unlisten(Event::TransferComplete);
        assert_eq!(rb.intmask1.get(), 0x000F_000F);
    }

    #[test]
    fn repeat_and_block_size_updates() {
        let (mut chs, rb) = channels();
        chs.ch0.set_block_size(1024).unwrap();
        chs.ch0.set_transfer_count(7);
        chs.ch0.set_dst_repeat(Some(4)).unwrap();
        assert_eq!(rb.ch[0].dtctl.read(DTCTL::BLKSIZE), 0);
        assert_eq!(chs.ch0.remaining_transfers(), 7);
        assert_eq!(rb.ch[0].rpt.read(RPT::DRPT), 4);
        assert!(rb.ch[0].chctl.is_set(CHCTL::DRPTEN));
        assert!(chs.ch0.set_src_repeat(Some(0)).is_err());
    }

    #[test]
    fn llp_address_must_be_word_aligned() {
        let (mut chs, rb) = channels();
        assert!(unsafe { chs.ch3.set_llp_addr(0x2000_0006, LlpMode::WaitRequest) }.is_err());
        assert!(!rb.ch[3].chctl.is_set(CHCTL::LLPEN));
        unsafe { chs.ch3.set_llp_addr(0x2000_0040, LlpMode::RunImmediately) }.unwrap();
        assert_eq!(rb.ch[3].llp.get(), 0x2000_0040);
        assert!(rb.ch[3].chctl.is_set(CHCTL::LLPEN));
        assert!(rb.ch[3].chctl.is_set(CHCTL::LLPRUN));
        chs.ch3.disable_llp();
        assert!(!rb.ch[3].chctl.is_set(CHCTL::LLPEN));
    }

    #[test]
    fn trigger_is_routed_through_aos() {
        let (mut chs, _) = channels();
        let (aos_regs, aos_rb) = testing::block::<crate::pac::aos::RegisterBlock>();
        let mut aos = Aos::new(aos_regs);
        chs.ch1
            .set_trigger(&mut aos, EventSource::SpiReceiveFull)
            .unwrap();
        assert_eq!(aos_rb.dma_trgsel[1].get(), 0x080);
    }

    #[test]
    fn software_trigger_routes_and_fires() {
        use crate::pac::aos::INTSFTTRG;
        let (mut chs, _) = channels();
        let (aos_regs, aos_rb) = testing::block::<crate::pac::aos::RegisterBlock>();
        let mut aos = Aos::new(aos_regs);
        chs.ch2.software_trigger(&mut aos).unwrap();
        assert_eq!(aos_rb.dma_trgsel[2].get(), 0x1FF);
        assert!(aos_rb.intsfttrg.is_set(INTSFTTRG::STRG));
    }

    #[test]
    fn init_from_loads_all_six_words() {
        let (mut chs, rb) = channels();
        let desc = LlpDescriptor {
            sar: 0x2000_0100,
            dar: 0x2000_0200,
            dtctl: 0x0003_0010,
            rpt: 0x0004_0002,
            llp: 0x2000_0300,
            chctl: 0x0000_1105,
        };
        chs.ch1.enable();
        chs.ch1.init_from(&desc);
        let ch = &rb.ch[1];
        assert_eq!(
            [
                ch.sar.get(),
                ch.dar.get(),
                ch.dtctl.get(),
                ch.rpt.get(),
                ch.llp.get(),
                ch.chctl.get(),
            ],
            [desc.sar, desc.dar, desc.dtctl, desc.rpt, desc.llp, desc.chctl]
        );
        assert!(!chs.ch1.is_enabled());
    }

    #[test]
    fn set_llp_links_static_descriptor() {
        let (mut chs, rb) = channels();
        let cfg = ChannelConfig {
            src_addr: 0x2000_0000,
            block_size: 4,
            ..Default::default()
        };
        let next: &'static LlpDescriptor = Box::leak(Box::new(LlpDescriptor::new(&cfg).unwrap()));
        chs.ch0.set_llp(next, LlpMode::RunImmediately);
        assert_eq!(rb.ch[0].llp.get(), next.address());
        assert!(rb.ch[0].chctl.is_set(CHCTL::LLPEN));
        assert!(rb.ch[0].chctl.is_set(CHCTL::LLPRUN));

        chs.ch1.set_llp(next, LlpMode::WaitRequest);
        assert!(rb.ch[1].chctl.is_set(CHCTL::LLPEN));
        assert!(!rb.ch[1].chctl.is_set(CHCTL::LLPRUN));
    }

    #[test]
    fn controller_busy_flag() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let dma = Dma::new(regs);
        assert!(!dma.is_busy());
        rb.chstat.write(CHSTAT::DMAACT::SET);
        assert!(dma.is_busy());
    }
}
