/*!
  # TIMER4
  Motor control timer: one 16-bit counter ([`cnt`]) drives six output compare
  channels ([`oco`]) arranged in three high/low pairs U, V and W, a PWM
  generator with dead time insertion per pair ([`pwm`]), and six special event
  channels ([`sevt`]) that raise ADC start events at programmed counts.

  ## Example
  ```ignore
    let timer4 = Timer4::new(dp.TMR4).split();
    let mut cnt = timer4.cnt;
    let mut uh = timer4.oco.uh;

    cnt.init(&CounterConfig {
        period: 2000,
        mode: CountMode::Triangle,
        ..Default::default()
    })?;
    uh.init(&OcoConfig::default());
    uh.set_compare(500);
    uh.set_high_mode(&HighChannelMode {
        actions: Actions {
            up_compare: OutputAction::High,
            down_compare: OutputAction::Low,
            ..Default::default()
        },
        conditions: MatchConditions::ALL,
    })?;
    uh.enable_output(true);
    cnt.start();
  ```
*/

use crate::pac::{self, timer4::RegisterBlock, Shared};

pub mod cnt;
pub mod oco;
pub mod pwm;
pub mod sevt;

pub use cnt::Counter;
pub use oco::OcoChannel;
pub use pwm::Pwm;
pub use sevt::SevtChannel;

/// Output compare or special event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Uh,
    Ul,
    Vh,
    Vl,
    Wh,
    Wl,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Uh,
        Channel::Ul,
        Channel::Vh,
        Channel::Vl,
        Channel::Wh,
        Channel::Wl,
    ];

    /// Register array index.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn pair(self) -> Pair {
        match self {
            Channel::Uh | Channel::Ul => Pair::U,
            Channel::Vh | Channel::Vl => Pair::V,
            Channel::Wh | Channel::Wl => Pair::W,
        }
    }

    /// High channels have 16-bit mode words, low channels 32-bit ones.
    pub const fn is_high(self) -> bool {
        self.index() % 2 == 0
    }
}

/// Channel pair sharing one PWM generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pair {
    U,
    V,
    W,
}

impl Pair {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One set of six channels.
pub struct Channels<T> {
    pub uh: T,
    pub ul: T,
    pub vh: T,
    pub vl: T,
    pub wh: T,
    pub wl: T,
}

impl<T> Channels<T> {
    fn new(f: impl Fn(Channel) -> T) -> Self {
        Channels {
            uh: f(Channel::Uh),
            ul: f(Channel::Ul),
            vh: f(Channel::Vh),
            vl: f(Channel::Vl),
            wh: f(Channel::Wh),
            wl: f(Channel::Wl),
        }
    }
}

/// Sub-blocks obtained from [`Timer4::split`].
pub struct Parts {
    pub cnt: Counter,
    pub oco: Channels<OcoChannel>,
    pub pwm: Pwm,
    pub sevt: Channels<SevtChannel>,
}

/// TIMER4 unit.
pub struct Timer4 {
    tmr: pac::TMR4,
}

impl Timer4 {
    pub fn new(tmr: pac::TMR4) -> Self {
        Self { tmr }
    }

    pub fn split(self) -> Parts {
        let tmr: Shared<RegisterBlock> = self.tmr.share();
        Parts {
            cnt: Counter::new(tmr),
            oco: Channels::new(|ch| OcoChannel::new(tmr, ch)),
            pwm: Pwm::new(tmr),
            sevt: Channels::new(|ch| SevtChannel::new(tmr, ch)),
        }
    }

    pub fn free(self) -> pac::TMR4 {
        self.tmr
    }
}
