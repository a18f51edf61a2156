//! Core library for the ghcstar deterministic simulator.
//!
//! Drives the GHC codec end to end: a seeded generator produces 6LoWPAN next headers
//! (UDP, ICMPv6, IPv6 extension headers) with realistic redundancy, each header is
//! compressed into a frame, sent through a lossy and bit-flipping channel, then
//! decompressed in place and checked against the original. The codec itself lives
//! in the `ghcstar` crate.

use std::fs;
use std::net::Ipv6Addr;
use std::path::Path;

use ghcstar::constants::GHC_STATIC_DICTIONARY;
use ghcstar::{
    AddressPair, GhcCompressor, GhcConfig, GhcDecompressor, GhcError, GhcNextHeader,
    HeaderSplice, compress_in_place, decompress_in_place,
};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Configuration for a simulation scenario.
///
/// Serializable so that a failing scenario can be saved and replayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub num_packets: usize,
    /// Number of mesh nodes whose addresses seed the codec context.
    pub node_count: usize,
    /// Upper bound on generated header length; clamped to the codec's payload limit.
    pub max_header_len: usize,
    /// Chance that a header body segment is a run of zeros.
    pub zero_run_probability: f64,
    /// Chance that a header body segment repeats source or destination address bytes.
    pub address_reuse_probability: f64,
    pub channel_packet_loss_probability: f64,
    /// Chance that a delivered frame has one bit flipped.
    pub channel_bit_error_probability: f64,
    pub codec: GhcConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_packets: 20,
            node_count: 8,
            max_header_len: 96,
            zero_run_probability: 0.3,
            address_reuse_probability: 0.3,
            channel_packet_loss_probability: 0.0,
            channel_bit_error_probability: 0.0,
            codec: GhcConfig {
                emit_stop_code: true,
                ..Default::default()
            },
        }
    }
}

/// Errors that can occur during a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Packet generator exhausted early")]
    PacketGenerationExhausted,

    #[error("Packet {index}: compression failed: {error}")]
    CompressionFailed { index: usize, error: GhcError },

    #[error("Packet {index}: decompression failed: {error}")]
    DecompressionFailed { index: usize, error: GhcError },

    #[error("Packet {index}: verification failed: {message}")]
    VerificationFailed { index: usize, message: String },

    #[error("Failed to load config {path}: {message}")]
    Config { path: String, message: String },
}

/// Loads a JSON document into any serde-deserializable configuration.
///
/// # Errors
/// - [`SimError::Config`] - The file cannot be read or parsed
pub fn load_json_config<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, SimError> {
    let config_error = |message: String| SimError::Config {
        path: path.display().to_string(),
        message,
    };
    let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))
}

/// One generated next header plus the context and payload around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHeader {
    pub kind: GhcNextHeader,
    pub addresses: AddressPair,
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Generates a deterministic stream of 6LoWPAN next headers.
pub struct HeaderGenerator {
    rng: StdRng,
    config: SimConfig,
    nodes: Vec<Ipv6Addr>,
    headers_generated: usize,
}

impl HeaderGenerator {
    /// Creates a generator whose node addresses and headers derive from `config.seed`.
    pub fn new(config: &SimConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let node_count = config.node_count.max(2);
        let global = rng.random_bool(0.5);
        let nodes = (0..node_count)
            .map(|index| {
                let node = index as u16 + 1;
                if global {
                    Ipv6Addr::new(0x2001, 0x0DB8, 0, 0, 0, 0x00FF, 0xFE00, node)
                } else {
                    Ipv6Addr::new(0xFE80, 0, 0, 0, 0x0212, 0x4B00, rng.random(), node)
                }
            })
            .collect();

        Self {
            rng,
            config: config.clone(),
            nodes,
            headers_generated: 0,
        }
    }

    /// Returns the next header, or `None` once `num_packets` have been produced.
    pub fn next_header(&mut self) -> Option<GeneratedHeader> {
        if self.headers_generated >= self.config.num_packets {
            return None;
        }
        self.headers_generated += 1;

        let addresses = self.pick_addresses();
        let max_len = self
            .config
            .max_header_len
            .min(self.config.codec.payload_limit())
            .max(8);
        let (kind, header) = match self.rng.random_range(0..3) {
            0 => (GhcNextHeader::Udp, self.udp_header()),
            1 => (
                GhcNextHeader::Icmpv6,
                self.icmpv6_header(&addresses, max_len),
            ),
            _ => {
                let eid = *[0u8, 1, 3, 4]
                    .choose(&mut self.rng)
                    .unwrap_or(&0);
                (
                    GhcNextHeader::Extension { eid },
                    self.extension_header(&addresses, max_len),
                )
            }
        };

        let payload_len = self.rng.random_range(0..24);
        let mut payload = vec![0u8; payload_len];
        self.rng.fill(&mut payload[..]);

        Some(GeneratedHeader {
            kind,
            addresses,
            header,
            payload,
        })
    }

    fn pick_addresses(&mut self) -> AddressPair {
        let source = self.rng.random_range(0..self.nodes.len());
        let offset = self.rng.random_range(1..self.nodes.len());
        let destination = (source + offset) % self.nodes.len();
        AddressPair::new(self.nodes[source], self.nodes[destination])
    }

    fn udp_header(&mut self) -> Vec<u8> {
        // Ports in the 0xF0Bx range are the ones 6LoWPAN NHC favors.
        let port = |rng: &mut StdRng| -> u16 {
            if rng.random_bool(0.6) {
                0xF0B0 | rng.random_range(0..16u16)
            } else {
                rng.random()
            }
        };
        let source_port = port(&mut self.rng);
        let destination_port = port(&mut self.rng);
        let length: u16 = self.rng.random_range(8..256);
        let checksum: u16 = self.rng.random();

        let mut header = Vec::with_capacity(8);
        header.extend_from_slice(&source_port.to_be_bytes());
        header.extend_from_slice(&destination_port.to_be_bytes());
        header.extend_from_slice(&length.to_be_bytes());
        header.extend_from_slice(&checksum.to_be_bytes());
        header
    }

    fn icmpv6_header(&mut self, addresses: &AddressPair, max_len: usize) -> Vec<u8> {
        let icmp_type = *[0x80u8, 0x81, 0x9B, 0x87, 0x88]
            .choose(&mut self.rng)
            .unwrap_or(&0x80);
        let mut header = vec![icmp_type, 0x00];
        header.extend_from_slice(&self.rng.random::<u16>().to_be_bytes());

        let body_len = self.rng.random_range(4..=max_len - header.len());
        self.fill_body(&mut header, body_len, addresses);
        header
    }

    fn extension_header(&mut self, addresses: &AddressPair, max_len: usize) -> Vec<u8> {
        // Extension headers are a multiple of 8 bytes: next header, length, options.
        let max_units = max_len / 8;
        let units = self.rng.random_range(1..=max_units);
        let next_header = *[0x11u8, 0x3A].choose(&mut self.rng).unwrap_or(&0x3A);
        let mut header = vec![next_header, (units - 1) as u8];
        self.fill_body(&mut header, units * 8 - 2, addresses);
        header
    }

    /// Appends `len` bytes mixing zero runs, address repeats, dictionary bytes and noise.
    fn fill_body(&mut self, out: &mut Vec<u8>, len: usize, addresses: &AddressPair) {
        let end = out.len() + len;
        while out.len() < end {
            let remaining = end - out.len();
            let roll: f64 = self.rng.random();
            if roll < self.config.zero_run_probability {
                let run = self.rng.random_range(1..=20).min(remaining);
                out.resize(out.len() + run, 0);
            } else if roll < self.config.zero_run_probability + self.config.address_reuse_probability
            {
                let octets = if self.rng.random_bool(0.5) {
                    addresses.source_octets()
                } else {
                    addresses.destination_octets()
                };
                let start = if self.rng.random_bool(0.5) { 0 } else { 8 };
                let take = (16 - start).min(remaining);
                out.extend_from_slice(&octets[start..start + take]);
            } else if self.rng.random_bool(0.2) {
                let start = self.rng.random_range(0..GHC_STATIC_DICTIONARY.len());
                let take = (GHC_STATIC_DICTIONARY.len() - start).min(remaining);
                out.extend_from_slice(&GHC_STATIC_DICTIONARY[start..start + take]);
            } else {
                let take = self.rng.random_range(1..=8).min(remaining);
                for _ in 0..take {
                    out.push(self.rng.random());
                }
            }
        }
    }
}

/// Represents the simulated link.
pub struct SimulatedChannel {
    rng: StdRng,
    packet_loss_probability: f64,
    bit_error_probability: f64,
}

impl SimulatedChannel {
    /// Creates a channel that drops and corrupts frames with the given probabilities.
    pub fn new(seed: u64, packet_loss_probability: f64, bit_error_probability: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&packet_loss_probability));
        debug_assert!((0.0..=1.0).contains(&bit_error_probability));
        Self {
            rng: StdRng::seed_from_u64(seed),
            packet_loss_probability,
            bit_error_probability,
        }
    }

    /// Transmits a frame: `None` if lost, otherwise the frame with at most one bit flipped.
    pub fn transmit(&mut self, mut frame: Vec<u8>) -> Option<Vec<u8>> {
        if self.packet_loss_probability > 0.0 && self.rng.random_bool(self.packet_loss_probability)
        {
            return None;
        }
        if !frame.is_empty()
            && self.bit_error_probability > 0.0
            && self.rng.random_bool(self.bit_error_probability)
        {
            let index = self.rng.random_range(0..frame.len());
            frame[index] ^= 1u8 << self.rng.random_range(0..8u32);
        }
        Some(frame)
    }
}

/// Counters collected over one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub packets_sent: usize,
    pub packets_lost: usize,
    pub packets_verified: usize,
    pub packets_corrupted: usize,
    /// Corrupted frames the receiver rejected with an error.
    pub corruption_rejected: usize,
    /// Corrupted frames that decoded to a different frame. GHC carries no checksum of
    /// its own; upper layers catch these.
    pub corruption_undetected: usize,
    /// Corrupted frames that still decoded to the original, e.g. a backreference
    /// redirected onto identical bytes.
    pub corruption_harmless: usize,
    pub header_bytes: usize,
    pub compressed_bytes: usize,
}

impl SimStats {
    /// Compressed size over uncompressed size for all sent headers.
    pub fn compression_ratio(&self) -> f64 {
        if self.header_bytes == 0 {
            return 1.0;
        }
        self.compressed_bytes as f64 / self.header_bytes as f64
    }

    /// Adds another run's counters to these.
    pub fn merge(&mut self, other: &SimStats) {
        self.packets_sent += other.packets_sent;
        self.packets_lost += other.packets_lost;
        self.packets_verified += other.packets_verified;
        self.packets_corrupted += other.packets_corrupted;
        self.corruption_rejected += other.corruption_rejected;
        self.corruption_undetected += other.corruption_undetected;
        self.corruption_harmless += other.corruption_harmless;
        self.header_bytes += other.header_bytes;
        self.compressed_bytes += other.compressed_bytes;
    }
}

/// Orchestrates a single deterministic simulation run.
pub struct GhcSimulator {
    config: SimConfig,
    compressor: GhcCompressor,
    decompressor: GhcDecompressor,
    generator: HeaderGenerator,
    channel: SimulatedChannel,
}

impl GhcSimulator {
    /// Creates a simulator; all randomness derives from `config.seed`.
    pub fn new(config: SimConfig) -> Self {
        let generator = HeaderGenerator::new(&config);
        let channel = SimulatedChannel::new(
            config.seed.wrapping_add(1),
            config.channel_packet_loss_probability,
            config.channel_bit_error_probability,
        );
        Self {
            compressor: GhcCompressor::with_config(config.codec),
            decompressor: GhcDecompressor::with_config(config.codec),
            generator,
            channel,
            config,
        }
    }

    /// Runs the simulation and returns its counters.
    ///
    /// # Errors
    /// - [`SimError::CompressionFailed`] - A generated header failed to compress
    /// - [`SimError::DecompressionFailed`] - An intact frame failed to decompress
    /// - [`SimError::VerificationFailed`] - An intact frame decompressed to different bytes
    pub fn run(&mut self) -> Result<SimStats, SimError> {
        let mut stats = SimStats::default();

        for index in 0..self.config.num_packets {
            let generated = self
                .generator
                .next_header()
                .ok_or(SimError::PacketGenerationExhausted)?;
            let expected = uncompressed_frame(&generated);

            let (frame, compressed_len) = self
                .compress_frame(&generated)
                .map_err(|error| SimError::CompressionFailed { index, error })?;
            stats.packets_sent += 1;
            stats.header_bytes += generated.header.len();
            stats.compressed_bytes += compressed_len;
            debug!(
                index,
                kind = ?generated.kind,
                header_len = generated.header.len(),
                compressed_len,
                "Frame compressed"
            );

            let Some(received) = self.channel.transmit(frame.clone()) else {
                stats.packets_lost += 1;
                continue;
            };

            let corrupted = received != frame;
            if corrupted {
                stats.packets_corrupted += 1;
            }

            let Some(kind) = received.first().copied().and_then(GhcNextHeader::from_dispatch)
            else {
                if corrupted {
                    debug!(index, "Corrupted frame carries an unknown dispatch");
                    stats.corruption_rejected += 1;
                    continue;
                }
                return Err(SimError::VerificationFailed {
                    index,
                    message: format!("unknown dispatch in frame {:02X?}", received),
                });
            };

            match self.decompress_frame(received, &generated.addresses) {
                Ok(restored) if kind == generated.kind && restored == expected => {
                    stats.packets_verified += 1;
                    if corrupted {
                        stats.corruption_harmless += 1;
                    }
                }
                Ok(_) if corrupted => {
                    debug!(index, "Corrupted frame decoded to different bytes");
                    stats.corruption_undetected += 1;
                }
                Ok(restored) => {
                    return Err(SimError::VerificationFailed {
                        index,
                        message: format!(
                            "expected {:?} frame {:02X?}, got {:?} frame {:02X?}",
                            generated.kind, expected, kind, restored
                        ),
                    });
                }
                Err(error) if corrupted => {
                    debug!(index, %error, "Corrupted frame rejected");
                    stats.corruption_rejected += 1;
                }
                Err(error) => return Err(SimError::DecompressionFailed { index, error }),
            }
        }

        debug!(
            seed = self.config.seed,
            sent = stats.packets_sent,
            lost = stats.packets_lost,
            verified = stats.packets_verified,
            ratio = stats.compression_ratio(),
            "Simulation run finished"
        );
        Ok(stats)
    }

    /// Builds `[dispatch][stream][payload]`, or `[dispatch][len][stream][payload]` when
    /// the stream carries no stop code. Returns the frame and the stream length.
    fn compress_frame(&self, generated: &GeneratedHeader) -> Result<(Vec<u8>, usize), GhcError> {
        let mut frame = uncompressed_frame(generated);
        let compressed_len = compress_in_place(
            &mut frame,
            1,
            generated.header.len(),
            &generated.addresses,
            &self.compressor,
        )?;
        if !self.config.codec.emit_stop_code {
            frame.replace_header(1, 0, &[compressed_len as u8])?;
        }
        Ok((frame, compressed_len))
    }

    fn decompress_frame(
        &self,
        mut frame: Vec<u8>,
        addresses: &AddressPair,
    ) -> Result<Vec<u8>, GhcError> {
        if self.config.codec.emit_stop_code {
            decompress_in_place(&mut frame, 1, None, addresses, &self.decompressor)?;
        } else {
            let region_len = frame.get(1).copied().map(usize::from).unwrap_or_default();
            decompress_in_place(&mut frame, 2, Some(region_len), addresses, &self.decompressor)?;
            frame.replace_header(1, 1, &[])?;
        }
        Ok(frame)
    }
}

/// Lays out `[dispatch][header][payload]`, the frame the receiver must reproduce.
pub fn uncompressed_frame(generated: &GeneratedHeader) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + generated.header.len() + generated.payload.len());
    frame.push(generated.kind.dispatch());
    frame.extend_from_slice(&generated.header);
    frame.extend_from_slice(&generated.payload);
    frame
}
