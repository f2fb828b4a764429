use q32m210_device::dma::{CH_CTRL0, CH_CTRL1, CH_STATUS};
use q32m210_device::DMA;
use tock_registers::fields::FieldValue;
use tock_registers::interfaces::{Readable, Writeable};

/// One of the four DMA channels.
#[derive(Debug, Clone, Copy)]
pub enum DmaChannel {
    Ch0 = 0,
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
}

#[derive(Debug, Clone, Copy)]
pub enum DmaWordSize {
    Bits8,
    Bits16,
    Bits32,
}

#[derive(Debug, Clone, Copy)]
pub enum DmaTransferType {
    MemToMem,
    MemToPeripheral,
    PeripheralToMem,
    PeripheralToPeripheral,
}

#[derive(Debug, Clone, Copy)]
pub enum DmaAddrMode {
    Linear,
    Circular,
}

/// Configuration of one DMA channel transfer.
#[derive(Debug, Clone, Copy)]
pub struct DmaChannelConfig {
    pub transfer_type: DmaTransferType,
    /// Peripheral request line feeding the source side.
    pub src_select: u32,
    /// Peripheral request line fed by the destination side.
    pub dest_select: u32,
    pub src_word_size: DmaWordSize,
    pub dest_word_size: DmaWordSize,
    pub src_addr_increment: bool,
    pub dest_addr_increment: bool,
    pub addr_mode: DmaAddrMode,
    pub priority: u32,
    pub big_endian: bool,
    pub start_int: bool,
    pub counter_int: bool,
    pub complete_int: bool,
    pub error_int: bool,
    pub disable_int: bool,
}

impl Default for DmaChannelConfig {
    fn default() -> Self {
        DmaChannelConfig {
            transfer_type: DmaTransferType::MemToMem,
            src_select: 0,
            dest_select: 0,
            src_word_size: DmaWordSize::Bits32,
            dest_word_size: DmaWordSize::Bits32,
            src_addr_increment: true,
            dest_addr_increment: true,
            addr_mode: DmaAddrMode::Linear,
            priority: 0,
            big_endian: false,
            start_int: false,
            counter_int: false,
            complete_int: false,
            error_int: false,
            disable_int: false,
        }
    }
}

impl DmaChannelConfig {
    /// Builds the channel control word, with the enable bit set.
    fn ctrl0(&self) -> FieldValue<u32, CH_CTRL0::Register> {
        let word_size = |size: DmaWordSize| match size {
            DmaWordSize::Bits8 => 0,
            DmaWordSize::Bits16 => 1,
            DmaWordSize::Bits32 => 2,
        };

        let transfer_type = match self.transfer_type {
            DmaTransferType::MemToMem => CH_CTRL0::TRANSFER_TYPE::MemToMem,
            DmaTransferType::MemToPeripheral => CH_CTRL0::TRANSFER_TYPE::MemToPeripheral,
            DmaTransferType::PeripheralToMem => CH_CTRL0::TRANSFER_TYPE::PeripheralToMem,
            DmaTransferType::PeripheralToPeripheral => {
                CH_CTRL0::TRANSFER_TYPE::PeripheralToPeripheral
            }
        };

        CH_CTRL0::ENABLE::SET
            + CH_CTRL0::ADDR_MODE.val(matches!(self.addr_mode, DmaAddrMode::Circular) as u32)
            + CH_CTRL0::SRC_ADDR_INC.val(self.src_addr_increment as u32)
            + CH_CTRL0::DEST_ADDR_INC.val(self.dest_addr_increment as u32)
            + transfer_type
            + CH_CTRL0::CHANNEL_PRIORITY.val(self.priority)
            + CH_CTRL0::SRC_SELECT.val(self.src_select)
            + CH_CTRL0::DEST_SELECT.val(self.dest_select)
            + CH_CTRL0::SRC_WORD_SIZE.val(word_size(self.src_word_size))
            + CH_CTRL0::DEST_WORD_SIZE.val(word_size(self.dest_word_size))
            + CH_CTRL0::START_INT_ENABLE.val(self.start_int as u32)
            + CH_CTRL0::COUNTER_INT_ENABLE.val(self.counter_int as u32)
            + CH_CTRL0::COMPLETE_INT_ENABLE.val(self.complete_int as u32)
            + CH_CTRL0::ERROR_INT_ENABLE.val(self.error_int as u32)
            + CH_CTRL0::DISABLE_INT_ENABLE.val(self.disable_int as u32)
            + CH_CTRL0::BYTE_ORDER.val(self.big_endian as u32)
    }
}

/// Events a channel has signalled since they were last cleared.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmaEvents {
    pub start: bool,
    pub counter: bool,
    pub complete: bool,
    pub error: bool,
    pub disable: bool,
    pub active: bool,
}

/// The four-channel DMA controller.
pub struct Dma {
    regs: DMA,
}

impl Dma {
    pub(crate) fn new(regs: DMA) -> Self {
        Dma { regs }
    }

    fn channel(&self, channel: DmaChannel) -> &q32m210_device::dma::DmaChannelRegisters {
        &self.regs.ch[channel as usize]
    }

    /// Configures a channel for a transfer and enables it.
    ///
    /// The channel is disabled first so the address and length registers
    /// can be updated safely.
    pub fn configure_channel(
        &mut self,
        channel: DmaChannel,
        config: DmaChannelConfig,
        transfer_length: u16,
        counter_int_value: u16,
        src_addr: u32,
        dest_addr: u32,
    ) {
        let ch = self.channel(channel);

        ch.ctrl0.set(0);

        ch.src_base_addr.set(src_addr);
        ch.dest_base_addr.set(dest_addr);

        ch.ctrl1.write(
            CH_CTRL1::TRANSFER_LENGTH.val(transfer_length as u32)
                + CH_CTRL1::COUNTER_INT_VALUE.val(counter_int_value as u32),
        );

        ch.ctrl0.write(config.ctrl0());
    }

    /// Disables a channel, ending any transfer in flight.
    pub fn stop_channel(&mut self, channel: DmaChannel) {
        self.channel(channel).ctrl0.set(0);
    }

    /// Reads a channel's event flags.
    pub fn channel_events(&self, channel: DmaChannel) -> DmaEvents {
        let status = self.channel(channel).status.extract();

        DmaEvents {
            start: status.is_set(CH_STATUS::START_INT),
            counter: status.is_set(CH_STATUS::COUNTER_INT),
            complete: status.is_set(CH_STATUS::COMPLETE_INT),
            error: status.is_set(CH_STATUS::ERROR_INT),
            disable: status.is_set(CH_STATUS::DISABLE_INT),
            active: status.is_set(CH_STATUS::ACTIVE),
        }
    }

    /// Acknowledges all of a channel's event flags.
    pub fn clear_channel_events(&mut self, channel: DmaChannel) {
        self.channel(channel).status.write(
            CH_STATUS::START_INT::SET
                + CH_STATUS::COUNTER_INT::SET
                + CH_STATUS::COMPLETE_INT::SET
                + CH_STATUS::ERROR_INT::SET
                + CH_STATUS::DISABLE_INT::SET,
        );
    }
}

#[cfg(test)]
mod test {
    use super::{DmaAddrMode, DmaChannelConfig, DmaTransferType, DmaWordSize};

    #[test]
    fn default_config_enables_a_linear_incrementing_transfer() {
        let word = DmaChannelConfig::default().ctrl0().value;

        assert_eq!(word & 1, 1, "enable bit");
        assert_eq!(word & (1 << 1), 0, "linear addressing");
        assert_ne!(word & (1 << 2), 0, "source increments");
        assert_ne!(word & (1 << 3), 0, "destination increments");
    }

    #[test]
    fn transfer_shape_lands_in_the_expected_fields() {
        let config = DmaChannelConfig {
            transfer_type: DmaTransferType::PeripheralToMem,
            src_select: 0x5,
            dest_select: 0x9,
            src_word_size: DmaWordSize::Bits8,
            dest_word_size: DmaWordSize::Bits16,
            addr_mode: DmaAddrMode::Circular,
            complete_int: true,
            ..Default::default()
        };

        let word = config.ctrl0().value;

        assert_eq!((word >> 4) & 0x3, 2, "transfer type");
        assert_eq!((word >> 8) & 0xF, 0x5, "source select");
        assert_eq!((word >> 12) & 0xF, 0x9, "destination select");
        assert_eq!((word >> 16) & 0x3, 0, "source word size");
        assert_eq!((word >> 18) & 0x3, 1, "destination word size");
        assert_ne!(word & (1 << 1), 0, "circular addressing");
        assert_ne!(word & (1 << 22), 0, "complete interrupt");
    }
}
