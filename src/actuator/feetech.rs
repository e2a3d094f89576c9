// Feetech STS-series serial protocol
//
// Packet format: [0xFF, 0xFF, ID, Length, Instruction, Params..., Checksum]
// The same bus drives both the velocity-mode wheel motors and the
// position-mode steering servos, so every request/response pair runs under
// one bus lock to keep transactions from interleaving.

use std::io::{Read, Write};
use std::sync::Mutex;
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

pub const DEFAULT_BAUDRATE: u32 = 1_000_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Packet header bytes
const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Instruction set (subset used by this crate)
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
enum Instruction {
    Ping = 0x01,
    Read = 0x02,
    Write = 0x03,
}

/// Register addresses for the STS control table
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Register {
    OperatingMode = 33, // 1 byte: 0=position, 1=velocity
    TorqueEnable = 40,  // 1 byte: 0=off, 1=on
    GoalPosition = 42,  // 2 bytes
    GoalVelocity = 46,  // 2 bytes (signed, velocity mode)
    Lock = 55,          // 1 byte: 0=unlocked, 1=locked
    Moving = 66,        // 1 byte, read-only: non-zero while in motion
}

/// Operating modes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperatingMode {
    Position = 0,
    Velocity = 1,
}

/// Error types for Feetech communication
#[derive(Debug, thiserror::Error)]
pub enum FeetechError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response from servo {id}: {reason}")]
    InvalidResponse { id: u8, reason: String },

    #[error("Checksum mismatch for servo {id}")]
    ChecksumMismatch { id: u8 },

    #[error("Servo {id} returned error status: 0x{status:02X}")]
    ServoError { id: u8, status: u8 },

    #[error("Timeout waiting for response from servo {id}")]
    Timeout { id: u8 },

    #[error("Bus lock poisoned")]
    BusPoisoned,
}

pub type Result<T> = std::result::Result<T, FeetechError>;

/// Feetech servo bus. Safe to share between actuator handles; each
/// transaction holds the port for its full write/read cycle.
pub struct FeetechBus {
    port: Mutex<Box<dyn SerialPort>>,
}

impl FeetechBus {
    pub fn open(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self {
            port: Mutex::new(port),
        })
    }

    /// Checksum over everything after the header
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    fn build_packet(id: u8, instruction: Instruction, params: &[u8]) -> Vec<u8> {
        let length = (params.len() + 2) as u8; // instruction + checksum
        let mut packet = Vec::with_capacity(6 + params.len());

        packet.extend_from_slice(&HEADER);
        packet.push(id);
        packet.push(length);
        packet.push(instruction as u8);
        packet.extend_from_slice(params);

        let checksum_data = &packet[2..]; // skip header
        packet.push(Self::checksum(checksum_data));

        packet
    }

    /// Send one packet and read the status response, holding the bus lock
    /// for the whole exchange. Returns the response parameter bytes.
    fn transact(&self, id: u8, instruction: Instruction, params: &[u8]) -> Result<Vec<u8>> {
        let packet = Self::build_packet(id, instruction, params);
        let mut port = self.port.lock().map_err(|_| FeetechError::BusPoisoned)?;

        port.write_all(&packet)?;
        port.flush()?;

        Self::read_response(&mut **port, id)
    }

    fn read_response(port: &mut dyn SerialPort, expected_id: u8) -> Result<Vec<u8>> {
        let mut header = [0u8; 2];
        port.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                FeetechError::Timeout { id: expected_id }
            } else {
                FeetechError::Io(e)
            }
        })?;

        if header != HEADER {
            return Err(FeetechError::InvalidResponse {
                id: expected_id,
                reason: format!("Invalid header: {:02X?}", header),
            });
        }

        let mut id_length = [0u8; 2];
        port.read_exact(&mut id_length)?;
        let id = id_length[0];
        let length = id_length[1] as usize;

        if id != expected_id {
            return Err(FeetechError::InvalidResponse {
                id: expected_id,
                reason: format!("ID mismatch: expected {}, got {}", expected_id, id),
            });
        }

        // Remaining bytes: error + params + checksum
        let mut remaining = vec![0u8; length];
        port.read_exact(&mut remaining)?;

        let mut checksum_data = vec![id, length as u8];
        checksum_data.extend_from_slice(&remaining[..remaining.len() - 1]);
        let expected_checksum = Self::checksum(&checksum_data);
        let received_checksum = remaining[remaining.len() - 1];

        if expected_checksum != received_checksum {
            return Err(FeetechError::ChecksumMismatch { id });
        }

        let error_status = remaining[0];
        if error_status != 0 {
            return Err(FeetechError::ServoError {
                id,
                status: error_status,
            });
        }

        Ok(remaining[1..remaining.len() - 1].to_vec())
    }

    /// Ping a servo to check if it's connected
    pub fn ping(&self, id: u8) -> Result<bool> {
        match self.transact(id, Instruction::Ping, &[]) {
            Ok(_) => Ok(true),
            Err(FeetechError::Timeout { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn write_u8(&self, id: u8, register: Register, value: u8) -> Result<()> {
        debug!("Write u8 to servo {}: reg={:?}, value={}", id, register, value);
        self.transact(id, Instruction::Write, &[register as u8, value])?;
        Ok(())
    }

    pub fn write_u16(&self, id: u8, register: Register, value: u16) -> Result<()> {
        debug!(
            "Write u16 to servo {}: reg={:?}, value={}",
            id, register, value
        );
        let params = [register as u8, (value & 0xFF) as u8, (value >> 8) as u8];
        self.transact(id, Instruction::Write, &params)?;
        Ok(())
    }

    pub fn read_u8(&self, id: u8, register: Register) -> Result<u8> {
        let response = self.transact(id, Instruction::Read, &[register as u8, 1])?;
        if response.is_empty() {
            return Err(FeetechError::InvalidResponse {
                id,
                reason: "Empty response".to_string(),
            });
        }
        Ok(response[0])
    }

    // === High-level convenience methods ===

    pub fn enable_torque(&self, id: u8) -> Result<()> {
        self.write_u8(id, Register::TorqueEnable, 1)?;
        self.write_u8(id, Register::Lock, 1)
    }

    pub fn disable_torque(&self, id: u8) -> Result<()> {
        self.write_u8(id, Register::TorqueEnable, 0)?;
        self.write_u8(id, Register::Lock, 0)
    }

    /// Set operating mode (torque must be disabled first)
    pub fn set_operating_mode(&self, id: u8, mode: OperatingMode) -> Result<()> {
        self.write_u8(id, Register::OperatingMode, mode as u8)
    }

    /// Set goal velocity in raw ticks (velocity mode)
    pub fn set_goal_velocity(&self, id: u8, velocity: i16) -> Result<()> {
        self.write_u16(id, Register::GoalVelocity, encode_sign_magnitude(velocity))
    }

    /// Set goal position in raw ticks (position mode)
    pub fn set_goal_position(&self, id: u8, ticks: u16) -> Result<()> {
        self.write_u16(id, Register::GoalPosition, ticks)
    }

    /// Whether the servo reports itself in motion
    pub fn is_moving(&self, id: u8) -> Result<bool> {
        Ok(self.read_u8(id, Register::Moving)? != 0)
    }
}

/// Sign-magnitude encoding used for velocities:
/// Bit 15 = sign (1 = negative), Bits 0-14 = magnitude
fn encode_sign_magnitude(value: i16) -> u16 {
    if value >= 0 {
        value as u16
    } else {
        0x8000 | (-(value as i32) as u16)
    }
}
