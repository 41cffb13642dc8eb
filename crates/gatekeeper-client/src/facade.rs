//! The operation facade (§4.4): one method per supported controller
//! operation, each normalizing its controller argument, encoding a request,
//! dispatching it over UDP or TCP, and decoding the reply.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use gatekeeper_core::{addr, ControllerDescriptor, Protocol};
use gatekeeper_proto::records::{
    Ack, CardRecord, ControllerInfo, ControllerTime, DoorControl, EventRecord, ListenerConfig,
    StatusInfo, TimeProfile,
};
use gatekeeper_proto::{decode, encode, opcode, RawFrame};
use gatekeeper_transport::{udp, TcpTransport, UdpTransport};
use tracing::{debug, warn};

use crate::config::{bind_addr, CallOptions, Config};
use crate::error::{ClientError, Result};

fn require_nonzero_serial(serial: u32) -> Result<()> {
    if serial == 0 {
        Err(ClientError::InvalidArgument("controller serial must not be zero".to_string()))
    } else {
        Ok(())
    }
}

/// An open subscription to a controller's event channel, returned by
/// [`Gatekeeper::listen`]. Dropping this without calling [`stop`][Self::stop]
/// still signals the listener thread to exit, but does not wait for it.
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    wake_target: SocketAddrV4,
    handle: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Signals the listener loop to stop and waits for its thread to exit.
    pub fn stop(mut self) {
        self.signal();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn signal(&self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Ok(waker) = std::net::UdpSocket::bind("0.0.0.0:0") {
            let _ = waker.send_to(&[0u8; 64], self.wake_target);
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.signal();
        }
    }
}

/// Client for the access-control controller protocol: encodes each
/// operation, dispatches it over UDP or TCP, and decodes the reply.
pub struct Gatekeeper {
    udp: UdpTransport,
    tcp: TcpTransport,
}

impl Gatekeeper {
    /// Builds a facade from `config`, resolving the broadcast and listen
    /// endpoints up front.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Core` if `config.broadcast` or `config.listen`
    /// do not parse as `host[:port]`.
    pub fn new(config: Config) -> Result<Self> {
        let broadcast_endpoint = addr::resolve_destination(&config.broadcast)?;
        let listen_endpoint = addr::resolve_listener(&config.listen)?;
        let bind = bind_addr(config.bind);
        Ok(Self {
            udp: UdpTransport { bind, broadcast_endpoint, listen_endpoint, debug: config.debug },
            tcp: TcpTransport { bind, debug: config.debug },
        })
    }

    fn effective_address(
        &self,
        descriptor: &ControllerDescriptor,
        options: &CallOptions,
    ) -> Result<Option<SocketAddrV4>> {
        let spec = options.destination.as_deref().or(descriptor.address.as_deref());
        Ok(spec.map(addr::resolve_destination).transpose()?)
    }

    fn effective_protocol(&self, descriptor: &ControllerDescriptor, options: &CallOptions) -> Protocol {
        if options.destination.is_some() {
            options.protocol
        } else {
            descriptor.protocol
        }
    }

    fn dispatch(
        &self,
        frame: &RawFrame,
        descriptor: &ControllerDescriptor,
        options: &CallOptions,
    ) -> Result<Option<RawFrame>> {
        let address = self.effective_address(descriptor, options)?;
        let protocol = self.effective_protocol(descriptor, options);
        debug!(
            operation = frame.function_code(),
            serial = descriptor.serial,
            protocol = ?protocol,
            destination = ?address,
            "dispatching request"
        );
        let reply = if protocol == Protocol::Tcp {
            let Some(address) = address else {
                return Err(ClientError::InvalidArgument(
                    "TCP protocol requires an explicit destination address".to_string(),
                ));
            };
            self.tcp.send(frame, address, options.timeout)?
        } else {
            self.udp.send(frame, address, options.timeout)?
        };
        if reply.is_none() {
            warn!(operation = frame.function_code(), "request timed out or produced no reply");
        }
        Ok(reply)
    }

    fn call(
        &self,
        descriptor: impl Into<ControllerDescriptor>,
        options: &CallOptions,
        frame: RawFrame,
    ) -> Result<RawFrame> {
        let descriptor = descriptor.into();
        require_nonzero_serial(descriptor.serial)?;
        self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)
    }

    /// Queries a single controller's identity and network configuration.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_controller(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<ControllerInfo> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::get_controller(descriptor.serial);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::get_controller(reply.as_bytes())?)
    }

    /// Broadcasts a `GetController` request with serial 0 and collects
    /// every reply received within the timeout. An empty list is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` on socket failure.
    pub fn get_all_controllers(&self, options: &CallOptions) -> Result<Vec<ControllerInfo>> {
        let frame = encode::get_controller(0);
        let replies = self.udp.broadcast(&frame, options.timeout)?;
        replies
            .iter()
            .map(|reply| decode::get_controller(reply.as_bytes()).map_err(ClientError::from))
            .collect()
    }

    /// Reconfigures a controller's network settings. The controller never
    /// acknowledges this request; it completes as soon as the datagram (or
    /// TCP write) is sent.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_ip(
        &self,
        controller: impl Into<ControllerDescriptor>,
        ip: Ipv4Addr,
        mask: Ipv4Addr,
        gateway: Ipv4Addr,
        options: &CallOptions,
    ) -> Result<()> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_ip(descriptor.serial, ip, mask, gateway);
        self.dispatch(&frame, &descriptor, options)?;
        Ok(())
    }

    /// Reads a controller's clock.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_time(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<ControllerTime> {
        let frame = encode::get_time(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::controller_time(reply.as_bytes(), opcode::GET_TIME)?)
    }

    /// Sets a controller's clock.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_time(
        &self,
        controller: impl Into<ControllerDescriptor>,
        datetime: chrono::NaiveDateTime,
        options: &CallOptions,
    ) -> Result<ControllerTime> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_time(descriptor.serial, datetime)?;
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::controller_time(reply.as_bytes(), opcode::SET_TIME)?)
    }

    /// Reads a controller's live door/system status and most recent event.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_status(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<StatusInfo> {
        let frame = encode::get_status(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::get_status(reply.as_bytes())?)
    }

    /// Reads the host endpoint a controller pushes events to.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_listener(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<ListenerConfig> {
        let frame = encode::get_listener(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::get_listener(reply.as_bytes())?)
    }

    /// Configures the host endpoint a controller pushes events to.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_listener(
        &self,
        controller: impl Into<ControllerDescriptor>,
        ip: Ipv4Addr,
        port: u16,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_listener(descriptor.serial, ip, port);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::set_listener(reply.as_bytes())?)
    }

    /// Reads a door's control mode and unlock delay.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_door_control(
        &self,
        controller: impl Into<ControllerDescriptor>,
        door: u8,
        options: &CallOptions,
    ) -> Result<DoorControl> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::get_door_control(descriptor.serial, door);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::door_control(reply.as_bytes(), opcode::GET_DOOR_CONTROL)?)
    }

    /// Sets a door's control mode and unlock delay.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_door_control(
        &self,
        controller: impl Into<ControllerDescriptor>,
        door: u8,
        mode: u8,
        delay: u8,
        options: &CallOptions,
    ) -> Result<DoorControl> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_door_control(descriptor.serial, door, mode, delay);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::door_control(reply.as_bytes(), opcode::SET_DOOR_CONTROL)?)
    }

    /// Momentarily unlocks a door.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn open_door(
        &self,
        controller: impl Into<ControllerDescriptor>,
        door: u8,
        options: &CallOptions,
    ) -> Result<bool> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::open_door(descriptor.serial, door);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::open_door(reply.as_bytes())?)
    }

    /// Reads the number of cards stored on a controller.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_cards(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<u32> {
        let frame = encode::get_cards(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::get_cards(reply.as_bytes())?)
    }

    /// Looks up a card by its card number.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_card(
        &self,
        controller: impl Into<ControllerDescriptor>,
        number: u32,
        options: &CallOptions,
    ) -> Result<CardRecord> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::get_card(descriptor.serial, number);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::card(reply.as_bytes(), opcode::GET_CARD)?)
    }

    /// Looks up a card by its storage index.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_card_by_index(
        &self,
        controller: impl Into<ControllerDescriptor>,
        index: u32,
        options: &CallOptions,
    ) -> Result<CardRecord> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::get_card_by_index(descriptor.serial, index);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::card(reply.as_bytes(), opcode::GET_CARD_BY_INDEX)?)
    }

    /// Adds or updates a card.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn put_card(
        &self,
        controller: impl Into<ControllerDescriptor>,
        card: &CardRecord,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::put_card(descriptor.serial, card)?;
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::PUT_CARD)?)
    }

    /// Deletes a single card by number.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn delete_card(
        &self,
        controller: impl Into<ControllerDescriptor>,
        number: u32,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::delete_card(descriptor.serial, number);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::DELETE_CARD)?)
    }

    /// Deletes every card stored on a controller.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn delete_all_cards(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<Ack> {
        let frame = encode::delete_all_cards(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::ack(reply.as_bytes(), opcode::DELETE_ALL_CARDS)?)
    }

    /// Reads a single event by index.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_event(
        &self,
        controller: impl Into<ControllerDescriptor>,
        index: u32,
        options: &CallOptions,
    ) -> Result<EventRecord> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::get_event(descriptor.serial, index);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::get_event(reply.as_bytes())?)
    }

    /// Reads the controller's current event index (the index of the most
    /// recently recorded event).
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_event_index(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<u32> {
        let frame = encode::get_event_index(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::get_event_index(reply.as_bytes())?)
    }

    /// Resets the controller's event index.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_event_index(
        &self,
        controller: impl Into<ControllerDescriptor>,
        index: u32,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_event_index(descriptor.serial, index);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::SET_EVENT_INDEX)?)
    }

    /// Enables or disables recording of special (non-access) events.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn record_special_events(
        &self,
        controller: impl Into<ControllerDescriptor>,
        enable: bool,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::record_special_events(descriptor.serial, enable);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::RECORD_SPECIAL_EVENTS)?)
    }

    /// Reads a time profile by id.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn get_time_profile(
        &self,
        controller: impl Into<ControllerDescriptor>,
        id: u8,
        options: &CallOptions,
    ) -> Result<TimeProfile> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::get_time_profile(descriptor.serial, id);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::time_profile(reply.as_bytes(), opcode::GET_TIME_PROFILE)?)
    }

    /// Adds or updates a time profile.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_time_profile(
        &self,
        controller: impl Into<ControllerDescriptor>,
        profile: &TimeProfile,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_time_profile(descriptor.serial, profile)?;
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::SET_TIME_PROFILE)?)
    }

    /// Deletes every time profile stored on a controller.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn delete_all_time_profiles(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<Ack> {
        let frame = encode::delete_all_time_profiles(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::ack(reply.as_bytes(), opcode::DELETE_ALL_TIME_PROFILES)?)
    }

    /// Adds a scheduled task.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn add_task(
        &self,
        controller: impl Into<ControllerDescriptor>,
        task: &gatekeeper_proto::records::Task,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::add_task(descriptor.serial, task)?;
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::ADD_TASK)?)
    }

    /// Activates the pending tasklist.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn refresh_tasklist(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<Ack> {
        let frame = encode::refresh_tasklist(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::ack(reply.as_bytes(), opcode::REFRESH_TASKLIST)?)
    }

    /// Clears the pending tasklist.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn clear_tasklist(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<Ack> {
        let frame = encode::clear_tasklist(controller.into().serial);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::ack(reply.as_bytes(), opcode::CLEAR_TASKLIST)?)
    }

    /// Enables or disables PC (host) control of the controller.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn set_pc_control(
        &self,
        controller: impl Into<ControllerDescriptor>,
        enable: bool,
        options: &CallOptions,
    ) -> Result<Ack> {
        let frame = encode::set_pc_control(controller.into().serial, enable);
        let descriptor = ControllerDescriptor::from(frame.serial());
        let reply = self.call(descriptor, options, frame)?;
        Ok(decode::ack(reply.as_bytes(), opcode::SET_PC_CONTROL)?)
    }

    /// Configures door interlock mode.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidArgument` if `mode` is not one of the
    /// controller's supported interlock modes (`0, 1, 2, 3, 4, 8`).
    pub fn set_interlock(
        &self,
        controller: impl Into<ControllerDescriptor>,
        mode: u8,
        options: &CallOptions,
    ) -> Result<Ack> {
        if !matches!(mode, 0 | 1 | 2 | 3 | 4 | 8) {
            return Err(ClientError::InvalidArgument(format!(
                "interlock mode {mode} is not one of 0, 1, 2, 3, 4, 8"
            )));
        }
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_interlock(descriptor.serial, mode);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::SET_INTERLOCK)?)
    }

    /// Activates or deactivates the four door keypads.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn activate_keypads(
        &self,
        controller: impl Into<ControllerDescriptor>,
        readers: [bool; 4],
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::activate_keypads(descriptor.serial, readers);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::ACTIVATE_KEYPADS)?)
    }

    /// Sets a door's four keypad passcodes.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidArgument` if any passcode exceeds
    /// `999_999`.
    pub fn set_door_passcodes(
        &self,
        controller: impl Into<ControllerDescriptor>,
        door: u8,
        passcodes: [u32; 4],
        options: &CallOptions,
    ) -> Result<Ack> {
        if let Some(bad) = passcodes.iter().find(|&&code| code > 999_999) {
            return Err(ClientError::InvalidArgument(format!(
                "passcode {bad} exceeds the maximum of 999999"
            )));
        }
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::set_door_passcodes(descriptor.serial, door, passcodes);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::SET_DOOR_PASSCODES)?)
    }

    /// Restores a controller's factory default parameters.
    ///
    /// # Errors
    ///
    /// See the module-level error taxonomy.
    pub fn restore_default_parameters(
        &self,
        controller: impl Into<ControllerDescriptor>,
        options: &CallOptions,
    ) -> Result<Ack> {
        let descriptor = controller.into();
        require_nonzero_serial(descriptor.serial)?;
        let frame = encode::restore_default_parameters(descriptor.serial);
        let reply = self.dispatch(&frame, &descriptor, options)?.ok_or(ClientError::NoReply)?;
        Ok(decode::ack(reply.as_bytes(), opcode::RESTORE_DEFAULT_PARAMETERS)?)
    }

    /// Starts the event listener on a dedicated thread, invoking `consumer`
    /// for every decoded event frame. Decode failures for a single datagram
    /// are logged and do not stop the loop.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if the listener socket cannot be
    /// bound.
    pub fn listen(
        &self,
        mut consumer: impl FnMut(EventRecord) + Send + 'static,
    ) -> Result<ListenerHandle> {
        let socket = self.udp.bind_listener()?;
        let debug = self.udp.debug;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_in_thread = Arc::clone(&stop);
        let wake_target = self.udp.listen_endpoint;

        let handle = std::thread::spawn(move || {
            udp::listen_loop(&socket, debug, move |frame| {
                if stop_in_thread.load(Ordering::SeqCst) {
                    return std::ops::ControlFlow::Break(());
                }
                match decode::event(frame.as_bytes()) {
                    Ok(event) => consumer(event),
                    Err(err) => warn!(error = %err, "dropping undecodable event frame"),
                }
                std::ops::ControlFlow::Continue(())
            });
        });

        Ok(ListenerHandle { stop, wake_target, handle: Some(handle) })
    }
}
