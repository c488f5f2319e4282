#![no_std]
#![no_main]

use defmt::{debug, error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART1;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartTx};
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker};
use static_cell::StaticCell;
use tcode_rp2040::{
    rx_errors, Capabilities, ChannelSource, PwmActuator, PwmActuators, RxChannel, TcodeBridge,
    UartReader, ACTUATOR_KEYS, TICK_PERIOD_MS,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Bytes received over UART, waiting for the control task.
static RX_CHANNEL: StaticCell<RxChannel> = StaticCell::new();

/// Longest reply text produced in one poll.
const REPLY_BUFFER_LEN: usize = 128;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("T-code controller starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let channel = RX_CHANNEL.init(Channel::new());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 115_200;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    // --- PWM Setup ---
    let pwm_config = PwmConfig::default();
    let outputs = (
        PwmActuator::new(
            ACTUATOR_KEYS[0],
            Pwm::new_output_a(p.PWM_SLICE0, p.PIN_0, pwm_config.clone()),
        ),
        PwmActuator::new(
            ACTUATOR_KEYS[1],
            Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, pwm_config.clone()),
        ),
        PwmActuator::new(
            ACTUATOR_KEYS[2],
            Pwm::new_output_a(p.PWM_SLICE2, p.PIN_4, pwm_config),
        ),
    );
    let (Some(linear), Some(rotate), Some(vibrate)) = outputs else {
        error!("PWM output setup failed");
        return;
    };
    let actuators = PwmActuators::new([linear, rotate, vibrate]);

    spawner.spawn(rx_task(UartReader::new(rx), channel).unwrap());
    spawner.spawn(control_task(ChannelSource::new(channel), actuators, tx).unwrap());

    info!("T-code controller initialized, waiting for commands...");
}

/// RX task - moves UART bytes into the channel.
#[embassy_executor::task]
async fn rx_task(mut reader: UartReader<'static>, channel: &'static RxChannel) {
    reader.run(channel).await
}

/// Control task - parses input, ticks the scheduler and sends replies.
#[embassy_executor::task]
async fn control_task(
    source: ChannelSource<'static>,
    actuators: PwmActuators<'static, 3>,
    mut tx: UartTx<'static, Async>,
) {
    let mut bridge: TcodeBridge<_, _, _> =
        TcodeBridge::new(source, actuators, Capabilities::new(&ACTUATOR_KEYS));
    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));
    let mut replies: heapless::String<REPLY_BUFFER_LEN> = heapless::String::new();

    loop {
        ticker.next().await;

        replies.clear();
        let report = bridge.poll(Instant::now().as_millis(), &mut replies);

        if report.rejected > 0 || report.overflows > 0 {
            warn!(
                "{} tokens rejected, {} overflows, {} UART errors",
                report.rejected,
                report.overflows,
                rx_errors()
            );
        }
        if report.lines > 0 {
            debug!(
                "{} lines, {} commands, {} active",
                report.lines,
                report.commands,
                bridge.session().active().len()
            );
        }

        if !replies.is_empty() {
            if let Err(e) = tx.write(replies.as_bytes()).await {
                error!("UART send error: {:?}", e);
            }
        }
    }
}
