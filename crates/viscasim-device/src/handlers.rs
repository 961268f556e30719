//! The camera's command catalogue.
//!
//! Keys are the leading payload bytes (after the address byte). Every handler
//! decodes all of its fields before touching the state, so a malformed
//! message leaves the device exactly as it was.

use tracing::warn;
use viscasim_frame::number::{
    byte, decode_flag, decode_s16, decode_s4, decode_s9, encode_bool, encode_s16, encode_s8, field,
};
use viscasim_frame::FrameError;

use crate::dispatch::Context;
use crate::registry::{Command, CommandKey, CommandRegistry, Handler};

type HandlerResult = Result<(), FrameError>;

/// Fixed reply to the version inquiry: vendor, model, ROM version, socket count.
pub const VERSION_INFO: [u8; 7] = [0x00, 0x01, 0x05, 0x11, 0x00, 0x00, 0x02];

/// Registration table for the standard command set.
pub const STANDARD_COMMANDS: &[(CommandKey, &str, Handler)] = &[
    (CommandKey::from_bytes([0x01, 0x00, 0x01]), "IF_Clear", if_clear),
    (CommandKey::from_bytes([0x01, 0x04, 0x00]), "CAM_Power", cam_power),
    (CommandKey::from_bytes([0x01, 0x04, 0x07]), "CAM_Zoom_Move", zoom_move),
    (CommandKey::from_bytes([0x01, 0x04, 0x08]), "CAM_Focus_Move", focus_move),
    (CommandKey::from_bytes([0x01, 0x04, 0x35]), "CAM_WB_Mode", wb_mode),
    (CommandKey::from_bytes([0x01, 0x04, 0x47]), "CAM_Zoom_Direct", zoom_direct),
    (CommandKey::from_bytes([0x01, 0x04, 0x48]), "CAM_Focus_Direct", focus_direct),
    (CommandKey::from_bytes([0x01, 0x06, 0x01]), "PanTilt_Drive", pan_tilt_drive),
    (CommandKey::from_bytes([0x01, 0x06, 0x02]), "PanTilt_Absolute", pan_tilt_absolute),
    (CommandKey::from_bytes([0x01, 0x06, 0x03]), "PanTilt_Relative", pan_tilt_relative),
    (CommandKey::from_bytes([0x01, 0x06, 0x04]), "PanTilt_Home", pan_tilt_home),
    (CommandKey::from_bytes([0x01, 0x06, 0x05]), "PanTilt_Reset", pan_tilt_home),
    (CommandKey::from_bytes([0x09, 0x00, 0x02]), "CAM_VersionInq", version_inq),
    (CommandKey::from_bytes([0x09, 0x04, 0x00]), "CAM_PowerInq", power_inq),
    (CommandKey::from_bytes([0x09, 0x04, 0x35]), "CAM_WBModeInq", wb_mode_inq),
    (CommandKey::from_bytes([0x09, 0x04, 0x47]), "CAM_ZoomPosInq", zoom_pos_inq),
    (CommandKey::from_bytes([0x09, 0x04, 0x48]), "CAM_FocusPosInq", focus_pos_inq),
    (CommandKey::from_bytes([0x09, 0x06, 0x12]), "PanTilt_PosInq", pan_tilt_pos_inq),
    (CommandKey::from_bytes([0x09, 0x7E, 0x7E, 0x00]), "LensBlockInq", lens_inq),
    (CommandKey::from_bytes([0x09, 0x7E, 0x7E, 0x01]), "CameraBlockInq", camera_inq),
    (CommandKey::from_bytes([0x09, 0x7E, 0x7E, 0x02]), "OtherBlockInq", other_inq),
    (CommandKey::from_bytes([0x09, 0x7E, 0x7E, 0x03]), "Enlargement1Inq", enlargement1_inq),
    (CommandKey::from_bytes([0x09, 0x7E, 0x7E, 0x04]), "Enlargement2Inq", enlargement2_inq),
    (CommandKey::from_bytes([0x09, 0x7E, 0x7E, 0x05]), "Enlargement3Inq", enlargement3_inq),
];

/// Fallback for payloads no key matches.
pub const UNMATCHED: Command = Command {
    name: "unmatched",
    handler: unmatched,
};

/// Build a registry holding [`STANDARD_COMMANDS`].
pub fn standard_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new(UNMATCHED);
    for &(key, name, handler) in STANDARD_COMMANDS {
        registry.register(key, name, handler);
    }
    registry
}

fn unmatched(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    warn!(payload = %hex::encode(payload), "no command handler");
    ctx.syntax_error();
    Ok(())
}

/// Nibble-packed 16-bit field at `offset`, unsigned.
fn unsigned_at(payload: &[u8], offset: usize) -> Result<f64, FrameError> {
    Ok(f64::from(decode_s16(field(payload, offset, 4)?)?))
}

/// Nibble-packed 16-bit field at `offset`, two's complement.
fn signed_at(payload: &[u8], offset: usize) -> Result<f64, FrameError> {
    Ok(f64::from(decode_s16(field(payload, offset, 4)?)? as i16))
}

fn if_clear(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    // Socket 0 completion only.
    ctx.inquiry(&[]);
    Ok(())
}

fn cam_power(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let on = decode_flag(byte(payload, 3)?)?;
    ctx.state.power = on;
    ctx.ack();
    Ok(())
}

fn zoom_move(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let speed = decode_s4(byte(payload, 3)?)?;
    ctx.state.zoom.set_speed(speed);
    ctx.ack();
    Ok(())
}

fn focus_move(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    // Far is the positive direction on the wire, towards zero in the model.
    let speed = -decode_s4(byte(payload, 3)?)?;
    ctx.state.focus.set_speed(speed);
    ctx.ack();
    Ok(())
}

fn wb_mode(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let mode = byte(payload, 3)? & 0x0F;
    ctx.state.wb_mode = mode;
    ctx.ack();
    Ok(())
}

fn zoom_direct(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let zoom = unsigned_at(payload, 3)?;
    let focus = if payload.len() > 7 {
        Some(unsigned_at(payload, 7)?)
    } else {
        None
    };
    ctx.state.zoom.set_position(zoom);
    if let Some(focus) = focus {
        ctx.state.focus.set_position(focus);
    }
    ctx.ack();
    Ok(())
}

fn focus_direct(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let focus = unsigned_at(payload, 3)?;
    ctx.state.focus.set_position(focus);
    ctx.ack();
    Ok(())
}

fn pan_tilt_drive(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    // 01 06 01 VV WW 0p 0t: each s9 field overlaps the other's bytes.
    let pan = decode_s9(field(payload, 3, 3)?)?;
    let tilt = decode_s9(field(payload, 4, 3)?)?;
    ctx.state.pan.set_speed(pan);
    ctx.state.tilt.set_speed(tilt);
    ctx.ack();
    Ok(())
}

/// Decode the pan and tilt fields shared by absolute and relative moves.
fn pan_tilt_fields(payload: &[u8]) -> Result<(f64, f64), FrameError> {
    // Bytes 3 and 4 carry the move speeds, which the model ignores.
    Ok((signed_at(payload, 5)?, signed_at(payload, 9)?))
}

fn pan_tilt_absolute(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let (pan, tilt) = pan_tilt_fields(payload)?;
    ctx.state.pan.set_position(pan);
    ctx.state.tilt.set_position(tilt);
    ctx.ack();
    Ok(())
}

fn pan_tilt_relative(ctx: &mut Context<'_>, payload: &[u8]) -> HandlerResult {
    let (pan, tilt) = pan_tilt_fields(payload)?;
    let state = &mut *ctx.state;
    state.pan.set_position(state.pan.position() + pan);
    state.tilt.set_position(state.tilt.position() + tilt);
    ctx.ack();
    Ok(())
}

fn pan_tilt_home(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    ctx.state.pan.home();
    ctx.state.tilt.home();
    ctx.ack();
    Ok(())
}

fn version_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    ctx.inquiry(&VERSION_INFO);
    Ok(())
}

fn power_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let power = encode_bool(ctx.state.power);
    ctx.inquiry(&[power]);
    Ok(())
}

fn wb_mode_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let mode = ctx.state.wb_mode & 0x0F;
    ctx.inquiry(&[mode]);
    Ok(())
}

fn zoom_pos_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let zoom = encode_s16(ctx.state.zoom.wire_position());
    ctx.inquiry(&zoom);
    Ok(())
}

fn focus_pos_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let focus = encode_s16(ctx.state.focus.wire_position());
    ctx.inquiry(&focus);
    Ok(())
}

fn pan_tilt_pos_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let mut fields = Vec::with_capacity(8);
    fields.extend_from_slice(&encode_s16(ctx.state.pan.wire_position()));
    fields.extend_from_slice(&encode_s16(ctx.state.tilt.wire_position()));
    ctx.inquiry(&fields);
    Ok(())
}

fn lens_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let s = &*ctx.state;
    let mut fields = Vec::with_capacity(13);
    fields.extend_from_slice(&encode_s16(s.zoom.wire_position()));
    fields.extend_from_slice(&encode_s8(i64::from(s.zoom_near_limit)));
    fields.extend_from_slice(&encode_s16(s.focus.wire_position()));
    fields.extend_from_slice(&[0x00, 0x00, 0x00]);
    ctx.inquiry(&fields);
    Ok(())
}

fn camera_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let s = &*ctx.state;
    let mut fields = Vec::with_capacity(13);
    fields.extend_from_slice(&encode_s8(i64::from(s.r_gain)));
    fields.extend_from_slice(&encode_s8(i64::from(s.b_gain)));
    fields.extend_from_slice(&[
        s.wb_mode & 0x0F,
        s.aperture_gain & 0x0F,
        s.exposure_mode & 0x1F,
        0x00,
        s.shutter_pos & 0x1F,
        s.iris_pos & 0x1F,
        s.gain_pos & 0x0F,
        s.bright_pos & 0x1F,
        s.exposure_comp_pos & 0x0F,
    ]);
    ctx.inquiry(&fields);
    Ok(())
}

fn other_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let s = &*ctx.state;
    let mut fields = Vec::with_capacity(12);
    fields.extend_from_slice(&[u8::from(s.power), 0x00, s.picture_effect_mode, 0x00, 0x00]);
    fields.extend_from_slice(&encode_s16(i64::from(s.camera_id)));
    fields.extend_from_slice(&[0x16 | u8::from(s.pal_system), 0x00, 0x00]);
    ctx.inquiry(&fields);
    Ok(())
}

fn enlargement1_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let s = &*ctx.state;
    let gamma_hs = ((s.gamma & 0x07) << 4) | (u8::from(s.high_sensitivity) << 3) | (s.nr_level & 0x07);
    let chroma_gl = ((s.chroma_suppress & 0x07) << 4) | (s.gain_limit & 0x0F);
    let mut fields = Vec::with_capacity(13);
    fields.extend_from_slice(&encode_s8(i64::from(s.digital_zoom_pos)));
    fields.extend_from_slice(&encode_s8(i64::from(s.af_activation_time)));
    fields.extend_from_slice(&encode_s8(i64::from(s.af_interval_time)));
    fields.extend_from_slice(&[0x08, 0x08, 0x00, gamma_hs, 0x01, 0x01, chroma_gl]);
    ctx.inquiry(&fields);
    Ok(())
}

fn enlargement2_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let mut fields = [0u8; 13];
    fields[0] = ctx.state.color_hue & 0x0F;
    ctx.inquiry(&fields);
    Ok(())
}

fn enlargement3_inq(ctx: &mut Context<'_>, _payload: &[u8]) -> HandlerResult {
    let mut fields = [0u8; 13];
    fields[5] = u8::from(ctx.state.defog);
    ctx.inquiry(&fields);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use viscasim_frame::{Reply, ACK, COMPLETION, ERROR_REPLY, INQUIRY_REPLY, SYNTAX_ERROR};

    use super::*;
    use crate::dispatch::{dispatch, Outcome};
    use crate::state::{DeviceState, AXIS_LIMIT};

    fn run(state: &mut DeviceState, payload: &[u8]) -> (Outcome, Vec<Vec<u8>>) {
        let registry = standard_registry();
        let mut out = Vec::new();
        let outcome = dispatch(&registry, state, 1, payload, &mut out);
        let bodies = out.iter().map(|r: &Reply| r.body().to_vec()).collect();
        (outcome, bodies)
    }

    fn acked() -> Vec<Vec<u8>> {
        vec![vec![ACK], vec![COMPLETION]]
    }

    fn syntax_error() -> Vec<Vec<u8>> {
        vec![vec![ERROR_REPLY, SYNTAX_ERROR]]
    }

    fn inquiry(fields: &[u8]) -> Vec<Vec<u8>> {
        let mut body = vec![INQUIRY_REPLY];
        body.extend_from_slice(fields);
        vec![body]
    }

    fn fresh() -> DeviceState {
        DeviceState::new(Instant::now())
    }

    #[test]
    fn every_key_is_unique() {
        let registry = standard_registry();
        assert_eq!(registry.len(), STANDARD_COMMANDS.len());
    }

    #[test]
    fn if_clear_sends_socket_zero_completion() {
        let mut state = fresh();
        let (outcome, replies) = run(&mut state, &[0x01, 0x00, 0x01]);
        assert!(matches!(outcome, Outcome::Handled("IF_Clear")));
        assert_eq!(replies, vec![vec![INQUIRY_REPLY]]);
    }

    #[test]
    fn zoom_move_short_form_is_fastest() {
        let mut state = fresh();
        let (_, replies) = run(&mut state, &[0x01, 0x04, 0x07, 0x03]);
        assert_eq!(state.zoom.speed(), -8);
        assert_eq!(replies, acked());

        run(&mut state, &[0x01, 0x04, 0x07, 0x25]);
        assert_eq!(state.zoom.speed(), 6);
        run(&mut state, &[0x01, 0x04, 0x07, 0x00]);
        assert_eq!(state.zoom.speed(), 0);
    }

    #[test]
    fn focus_move_is_inverted() {
        let mut state = fresh();
        run(&mut state, &[0x01, 0x04, 0x08, 0x23]);
        assert_eq!(state.focus.speed(), -4);
        run(&mut state, &[0x01, 0x04, 0x08, 0x02]);
        assert_eq!(state.focus.speed(), -8);
    }

    #[test]
    fn pan_tilt_drive_reads_overlapping_fields() {
        let mut state = fresh();
        let (_, replies) = run(&mut state, &[0x01, 0x06, 0x01, 0x10, 0x08, 0x01, 0x02]);
        assert_eq!(state.pan.speed(), 0x10);
        assert_eq!(state.tilt.speed(), -0x08);
        assert_eq!(replies, acked());

        run(&mut state, &[0x01, 0x06, 0x01, 0x10, 0x08, 0x03, 0x03]);
        assert_eq!(state.pan.speed(), 0);
        assert_eq!(state.tilt.speed(), 0);
    }

    #[test]
    fn absolute_move_sets_signed_positions() {
        let mut state = fresh();
        let payload = [
            0x01, 0x06, 0x02, 0x18, 0x14, 0x00, 0x01, 0x02, 0x03, 0x0F, 0x0F, 0x0F, 0x0E,
        ];
        let (_, replies) = run(&mut state, &payload);
        assert_eq!(state.pan.position(), 0x0123 as f64);
        assert_eq!(state.tilt.position(), -2.0);
        assert_eq!(replies, acked());
    }

    #[test]
    fn relative_move_adds_and_clamps() {
        let mut state = fresh();
        state.pan.set_position(100.0);
        state.tilt.set_position(f64::from(AXIS_LIMIT) - 1.0);
        let payload = [
            0x01, 0x06, 0x03, 0x18, 0x14, 0x0F, 0x0F, 0x0F, 0x06, 0x00, 0x00, 0x01, 0x00,
        ];
        run(&mut state, &payload);
        assert_eq!(state.pan.position(), 90.0);
        assert_eq!(state.tilt.position(), f64::from(AXIS_LIMIT));
    }

    #[test]
    fn truncated_move_is_rejected_without_mutation() {
        let mut state = fresh();
        state.pan.set_position(5.0);
        let (outcome, replies) = run(&mut state, &[0x01, 0x06, 0x02, 0x18, 0x14, 0x00, 0x01]);
        assert!(matches!(
            outcome,
            Outcome::Failed {
                command: "PanTilt_Absolute",
                error: FrameError::Truncated { .. }
            }
        ));
        assert_eq!(replies, syntax_error());
        assert_eq!(state.pan.position(), 5.0);
    }

    #[test]
    fn home_and_reset_stop_pan_tilt() {
        for key in [0x04, 0x05] {
            let mut state = fresh();
            state.pan.set_position(10.0);
            state.pan.set_speed(3);
            state.tilt.set_position(-10.0);
            state.zoom.set_speed(2);
            let (_, replies) = run(&mut state, &[0x01, 0x06, key]);
            assert_eq!(state.pan.position(), 0.0);
            assert_eq!(state.pan.speed(), 0);
            assert_eq!(state.tilt.position(), 0.0);
            assert_eq!(state.zoom.speed(), 2);
            assert_eq!(replies, acked());
        }
    }

    #[test]
    fn power_command_and_inquiry() {
        let mut state = fresh();
        let (_, replies) = run(&mut state, &[0x09, 0x04, 0x00]);
        assert_eq!(replies, inquiry(&[0x02]));

        run(&mut state, &[0x01, 0x04, 0x00, 0x03]);
        assert!(!state.power);
        let (_, replies) = run(&mut state, &[0x09, 0x04, 0x00]);
        assert_eq!(replies, inquiry(&[0x03]));

        let (_, replies) = run(&mut state, &[0x01, 0x04, 0x00, 0x07]);
        assert_eq!(replies, syntax_error());
        assert!(!state.power);
    }

    #[test]
    fn direct_zoom_and_focus() {
        let mut state = fresh();
        run(&mut state, &[0x01, 0x04, 0x47, 0x04, 0x00, 0x00, 0x00]);
        assert_eq!(state.zoom.position(), 16384.0);
        assert_eq!(state.focus.position(), 0.0);

        run(
            &mut state,
            &[0x01, 0x04, 0x47, 0x01, 0x00, 0x00, 0x00, 0x0F, 0x0F, 0x0F, 0x0F],
        );
        assert_eq!(state.zoom.position(), 4096.0);
        assert_eq!(state.focus.position(), f64::from(AXIS_LIMIT));

        run(&mut state, &[0x01, 0x04, 0x48, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(state.focus.position(), 256.0);

        let (_, replies) = run(&mut state, &[0x09, 0x04, 0x47]);
        assert_eq!(replies, inquiry(&[0x01, 0x00, 0x00, 0x00]));
        let (_, replies) = run(&mut state, &[0x09, 0x04, 0x48]);
        assert_eq!(replies, inquiry(&[0x00, 0x01, 0x00, 0x00]));
    }

    #[test]
    fn white_balance_mode_roundtrip() {
        let mut state = fresh();
        run(&mut state, &[0x01, 0x04, 0x35, 0x25]);
        assert_eq!(state.wb_mode, 0x05);
        let (_, replies) = run(&mut state, &[0x09, 0x04, 0x35]);
        assert_eq!(replies, inquiry(&[0x05]));
    }

    #[test]
    fn version_inquiry_is_fixed() {
        let mut state = fresh();
        let (_, replies) = run(&mut state, &[0x09, 0x00, 0x02]);
        assert_eq!(replies, inquiry(&VERSION_INFO));
    }

    #[test]
    fn pan_tilt_position_inquiry_encodes_negative() {
        let mut state = fresh();
        state.pan.set_position(-1.5);
        state.tilt.set_position(0x0123 as f64);
        let (_, replies) = run(&mut state, &[0x09, 0x06, 0x12]);
        assert_eq!(
            replies,
            inquiry(&[0x0F, 0x0F, 0x0F, 0x0F, 0x00, 0x01, 0x02, 0x03])
        );
    }

    #[test]
    fn block_inquiries_with_defaults() {
        let mut state = fresh();

        let (_, lens) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x00]);
        assert_eq!(lens, inquiry(&[0; 13]));

        let (_, camera) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x01]);
        assert_eq!(camera, inquiry(&[0; 13]));

        let (_, other) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x02]);
        assert_eq!(
            other,
            inquiry(&[0x01, 0x00, 0x00, 0x00, 0x00, 0x0F, 0x0E, 0x0D, 0x0C, 0x17, 0x00, 0x00])
        );

        let (_, enl1) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x03]);
        assert_eq!(
            enl1,
            inquiry(&[0x00, 0x00, 0x00, 0x05, 0x00, 0x07, 0x08, 0x08, 0x00, 0x00, 0x01, 0x01, 0x00])
        );

        let (_, enl2) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x04]);
        let mut expected = [0u8; 13];
        expected[0] = 0x09;
        assert_eq!(enl2, inquiry(&expected));

        let (_, enl3) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x05]);
        assert_eq!(enl3, inquiry(&[0; 13]));
    }

    #[test]
    fn block_inquiries_pack_settings() {
        let mut state = fresh();
        state.zoom.set_position(0x1234 as f64);
        state.zoom_near_limit = 0x5A;
        state.r_gain = 0xA5;
        state.wb_mode = 0x13;
        state.shutter_pos = 0x3F;
        state.gamma = 0x02;
        state.high_sensitivity = true;
        state.nr_level = 0x05;
        state.chroma_suppress = 0x03;
        state.gain_limit = 0x0C;
        state.defog = true;
        state.pal_system = false;

        let (_, lens) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x00]);
        assert_eq!(&lens[0][1..7], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x0A]);

        let (_, camera) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x01]);
        assert_eq!(&camera[0][1..6], &[0x0A, 0x05, 0x00, 0x00, 0x03]);
        assert_eq!(camera[0][9], 0x1F);

        let (_, other) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x02]);
        assert_eq!(other[0][10], 0x16);

        let (_, enl1) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x03]);
        assert_eq!(enl1[0][10], 0x2D);
        assert_eq!(enl1[0][13], 0x3C);

        let (_, enl3) = run(&mut state, &[0x09, 0x7E, 0x7E, 0x05]);
        assert_eq!(enl3[0][6], 0x01);
    }

    #[test]
    fn unknown_command_gets_syntax_error() {
        let mut state = fresh();
        let (outcome, replies) = run(&mut state, &[0x01, 0x7E, 0x01, 0x00]);
        assert!(matches!(outcome, Outcome::Unmatched));
        assert_eq!(replies, syntax_error());
    }
}
