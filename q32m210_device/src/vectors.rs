//! External interrupt table.

/// External interrupt sources, in vector-table order.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Interrupt {
    WAKEUP = 0,
    WATCHDOG = 1,
    RTC_ALARM = 2,
    RTC_CLOCK = 3,
    GPIO_GP0 = 4,
    GPIO_GP1 = 5,
    TIMER0 = 6,
    TIMER1 = 7,
    TIMER2 = 8,
    TIMER3 = 9,
    UART0_RX = 10,
    UART0_TX = 11,
    UART0_ERROR = 12,
    UART1_RX = 13,
    UART1_TX = 14,
    UART1_ERROR = 15,
    SPI0 = 16,
    SPI1 = 17,
    I2C = 18,
    DMA0 = 19,
    DMA1 = 20,
    DMA2 = 21,
    DMA3 = 22,
    ADC = 23,
    USB_WAKEUP = 24,
    USB_SDAV = 25,
    USB_SOF = 26,
    USB_SUTOK = 27,
    USB_SUSPEND = 28,
    USB_RESET = 29,
    USB_EP0IN = 30,
    USB_EP0OUT = 31,
    USB_EP2IN = 32,
    USB_EP3IN = 33,
    USB_EP4OUT = 34,
    USB_EP5OUT = 35,
}

unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}

#[cfg(all(feature = "rt", target_os = "none"))]
mod rt {
    extern "C" {
        fn WAKEUP();
        fn WATCHDOG();
        fn RTC_ALARM();
        fn RTC_CLOCK();
        fn GPIO_GP0();
        fn GPIO_GP1();
        fn TIMER0();
        fn TIMER1();
        fn TIMER2();
        fn TIMER3();
        fn UART0_RX();
        fn UART0_TX();
        fn UART0_ERROR();
        fn UART1_RX();
        fn UART1_TX();
        fn UART1_ERROR();
        fn SPI0();
        fn SPI1();
        fn I2C();
        fn DMA0();
        fn DMA1();
        fn DMA2();
        fn DMA3();
        fn ADC();
        fn USB_WAKEUP();
        fn USB_SDAV();
        fn USB_SOF();
        fn USB_SUTOK();
        fn USB_SUSPEND();
        fn USB_RESET();
        fn USB_EP0IN();
        fn USB_EP0OUT();
        fn USB_EP2IN();
        fn USB_EP3IN();
        fn USB_EP4OUT();
        fn USB_EP5OUT();
    }

    pub union Vector {
        _handler: unsafe extern "C" fn(),
        _reserved: usize,
    }

    #[link_section = ".vector_table.interrupts"]
    #[no_mangle]
    pub static __INTERRUPTS: [Vector; 36] = [
        Vector { _handler: WAKEUP },
        Vector { _handler: WATCHDOG },
        Vector { _handler: RTC_ALARM },
        Vector { _handler: RTC_CLOCK },
        Vector { _handler: GPIO_GP0 },
        Vector { _handler: GPIO_GP1 },
        Vector { _handler: TIMER0 },
        Vector { _handler: TIMER1 },
        Vector { _handler: TIMER2 },
        Vector { _handler: TIMER3 },
        Vector { _handler: UART0_RX },
        Vector { _handler: UART0_TX },
        Vector { _handler: UART0_ERROR },
        Vector { _handler: UART1_RX },
        Vector { _handler: UART1_TX },
        Vector { _handler: UART1_ERROR },
        Vector { _handler: SPI0 },
        Vector { _handler: SPI1 },
        Vector { _handler: I2C },
        Vector { _handler: DMA0 },
        Vector { _handler: DMA1 },
        Vector { _handler: DMA2 },
        Vector { _handler: DMA3 },
        Vector { _handler: ADC },
        Vector { _handler: USB_WAKEUP },
        Vector { _handler: USB_SDAV },
        Vector { _handler: USB_SOF },
        Vector { _handler: USB_SUTOK },
        Vector { _handler: USB_SUSPEND },
        Vector { _handler: USB_RESET },
        Vector { _handler: USB_EP0IN },
        Vector { _handler: USB_EP0OUT },
        Vector { _handler: USB_EP2IN },
        Vector { _handler: USB_EP3IN },
        Vector { _handler: USB_EP4OUT },
        Vector { _handler: USB_EP5OUT },
    ];
}
