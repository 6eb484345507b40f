//! Linked list descriptors
//!
//! When LLP is enabled, a channel that finishes its transfer loads a new
//! configuration from memory instead of stopping. A descriptor mirrors the
//! six configuration registers of a channel, so a chain of descriptors can
//! describe a scatter/gather transfer or, closed into a ring, a transfer that
//! never ends.

use super::{llp_bits, ChannelConfig, LlpMode};
use crate::error::{Error, Result};
use crate::pac::dma::{CHCTL, LLP};
use tock_registers::LocalRegisterCopy;

/// Channel configuration as loaded by the controller from memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C, align(4))]
pub struct LlpDescriptor {
    pub sar: u32,
    pub dar: u32,
    pub dtctl: u32,
    pub rpt: u32,
    pub llp: u32,
    pub chctl: u32,
}

impl LlpDescriptor {
    /// Packs `config` into a descriptor. The link taken from `config.llp` is
    /// kept and can be overwritten with [`LlpDescriptor::link`].
    pub fn new(config: &ChannelConfig) -> Result<Self> {
        let [sar, dar, dtctl, rpt, llp, chctl] = config.words()?;
        Ok(Self {
            sar,
            dar,
            dtctl,
            rpt,
            llp,
            chctl,
        })
    }

    /// Address of the descriptor as seen by the DMA controller.
    pub fn address(&self) -> u32 {
        self as *const Self as u32
    }

    /// Continues with the descriptor at `next`.
    pub fn link(&mut self, next: u32, mode: LlpMode) -> Result<()> {
        let next = llp_bits(next)?;
        let mut chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(self.chctl);
        chctl.modify(
            CHCTL::LLPEN::SET + CHCTL::LLPRUN.val((mode == LlpMode::RunImmediately) as u32),
        );
        self.chctl = chctl.get();
        self.llp = next;
        Ok(())
    }

    /// Continues with `next`, which must stay in place while the chain runs.
    pub fn link_to(&mut self, next: &LlpDescriptor, mode: LlpMode) {
        // descriptors are word aligned by construction
        let _ = self.link(next.address(), mode);
    }

    /// Makes this descriptor the last of its chain.
    pub fn terminate(&mut self) {
        let mut chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(self.chctl);
        chctl.modify(CHCTL::LLPEN::CLEAR + CHCTL::LLPRUN::CLEAR);
        self.chctl = chctl.get();
        self.llp = 0;
    }

    /// Address of the following descriptor, if any.
    pub fn next(&self) -> Option<u32> {
        let chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(self.chctl);
        if chctl.is_set(CHCTL::LLPEN) {
            let llp = LocalRegisterCopy::<u32, LLP::Register>::new(self.llp);
            Some(llp.read(LLP::LLP) << 2)
        } else {
            None
        }
    }
}

/// Links the descriptors of `chain` in order. With `ring` set, the last one
/// links back to the first, otherwise it terminates the chain.
///
/// The descriptors must not move while a channel walks the chain.
pub fn link_chain(chain: &mut [LlpDescriptor], mode: LlpMode, ring: bool) -> Result<()> {
    let len = chain.len();
    if len == 0 {
        return Err(Error::InvalidParameter);
    }
    let base = chain.as_ptr() as u32;
    let stride = core::mem::size_of::<LlpDescriptor>() as u32;
    for (i, desc) in chain.iter_mut().enumerate() {
        if i + 1 < len {
            desc.link(base + (i as u32 + 1) * stride, mode)?;
        } else if ring {
            desc.link(base, mode)?;
        } else {
            desc.terminate();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::{AddressMode, Llp, TransferWidth};

    fn config(src: u32) -> ChannelConfig {
        ChannelConfig {
            src_addr: src,
            dst_addr: 0x4001_C000,
            block_size: 8,
            transfer_count: 1,
            width: TransferWidth::Bits8,
            src_mode: AddressMode::Increment,
            ..Default::default()
        }
    }

    #[test]
    fn descriptor_matches_register_layout() {
        assert_eq!(core::mem::size_of::<LlpDescriptor>(), 24);
        assert_eq!(core::mem::align_of::<LlpDescriptor>(), 4);
    }

    #[test]
    fn new_carries_config_words() {
        let cfg = config(0x2000_0000);
        let desc = LlpDescriptor::new(&cfg).unwrap();
        assert_eq!(
            [desc.sar, desc.dar, desc.dtctl, desc.rpt, desc.llp, desc.chctl],
            cfg.words().unwrap()
        );
        assert_eq!(desc.next(), None);

        let linked = LlpDescriptor::new(&ChannelConfig {
            llp: Some(Llp {
                addr: 0x2000_0200,
                mode: LlpMode::WaitRequest,
            }),
            ..cfg
        })
        .unwrap();
        assert_eq!(linked.next(), Some(0x2000_0200));
    }

    #[test]
    fn link_sets_run_mode_and_rejects_unaligned() {
        let mut desc = LlpDescriptor::new(&config(0)).unwrap();
        assert_eq!(
            desc.link(0x2000_0001, LlpMode::WaitRequest),
            Err(Error::AddressAlignment)
        );
        assert_eq!(desc.next(), None);

        desc.link(0x2000_0010, LlpMode::RunImmediately).unwrap();
        let chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(desc.chctl);
        assert!(chctl.is_set(CHCTL::LLPRUN));
        assert_eq!(desc.next(), Some(0x2000_0010));

        desc.terminate();
        assert_eq!(desc.next(), None);
        assert_eq!(desc.llp, 0);
    }

    #[test]
    fn link_to_follows_descriptor_address() {
        let next = LlpDescriptor::new(&config(0x200)).unwrap();
        let mut desc = LlpDescriptor::new(&config(0x100)).unwrap();
        desc.link_to(&next, LlpMode::WaitRequest);
        assert_eq!(desc.next(), Some(next.address()));
        assert_eq!(desc.llp, next.address());
        let chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(desc.chctl);
        assert!(chctl.is_set(CHCTL::LLPEN));
        assert!(!chctl.is_set(CHCTL::LLPRUN));
    }

    #[test]
    fn chain_links_in_order() {
        let mut chain = [
            LlpDescriptor::new(&config(0x100)).unwrap(),
            LlpDescriptor::new(&config(0x200)).unwrap(),
            LlpDescriptor::new(&config(0x300)).unwrap(),
        ];
        link_chain(&mut chain, LlpMode::WaitRequest, false).unwrap();
        assert_eq!(chain[0].next(), Some(chain[1].address()));
        assert_eq!(chain[1].next(), Some(chain[2].address()));
        assert_eq!(chain[2].next(), None);
    }

    #[test]
    fn ring_closes_on_first() {
        let mut chain = [
            LlpDescriptor::new(&config(0x100)).unwrap(),
            LlpDescriptor::new(&config(0x200)).unwrap(),
        ];
        link_chain(&mut chain, LlpMode::RunImmediately, true).unwrap();
        assert_eq!(chain[1].next(), Some(chain[0].address()));
        assert_eq!(link_chain(&mut [], LlpMode::WaitRequest, true), Err(Error::InvalidParameter));
    }
}
