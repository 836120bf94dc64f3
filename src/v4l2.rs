//! Video4Linux2 ioctls (`linux/videodev2.h`, type `'V'`).
//!
//! Most commands print the caller's input on entry and what the driver filled in on
//! exit. Structures containing pointers, `long`s or `struct timeval` have a different
//! layout, and so a different request code, under each personality.

use crate::ioctl::{ior, iow, iowr};
use crate::layout::{Fetch, Reader};
use crate::personality::Personality;
use crate::printer::{Fetcher, Hex, Printer};
use crate::printnum::NumFmt;
use crate::quote::QuoteStyle;
use crate::syscall::Rval;
use crate::tcb::PrivData;
use crate::time::Timeval;

pub const IOCTL_TYPE: u32 = b'V' as u32;

const VIDEO_MAX_PLANES: usize = 8;

pub const V4L2_BUF_TYPE_VIDEO_CAPTURE: u32 = 1;
pub const V4L2_BUF_TYPE_VIDEO_OUTPUT: u32 = 2;
pub const V4L2_BUF_TYPE_VIDEO_OVERLAY: u32 = 3;
pub const V4L2_BUF_TYPE_VBI_CAPTURE: u32 = 4;
pub const V4L2_BUF_TYPE_VBI_OUTPUT: u32 = 5;
pub const V4L2_BUF_TYPE_SLICED_VBI_CAPTURE: u32 = 6;
pub const V4L2_BUF_TYPE_SLICED_VBI_OUTPUT: u32 = 7;
pub const V4L2_BUF_TYPE_VIDEO_OUTPUT_OVERLAY: u32 = 8;
pub const V4L2_BUF_TYPE_VIDEO_CAPTURE_MPLANE: u32 = 9;
pub const V4L2_BUF_TYPE_VIDEO_OUTPUT_MPLANE: u32 = 10;
pub const V4L2_BUF_TYPE_SDR_CAPTURE: u32 = 11;
pub const V4L2_BUF_TYPE_SDR_OUTPUT: u32 = 12;

xlat! {
    sorted V4L2_BUF_TYPES = [
        V4L2_BUF_TYPE_VIDEO_CAPTURE,
        V4L2_BUF_TYPE_VIDEO_OUTPUT,
        V4L2_BUF_TYPE_VIDEO_OVERLAY,
        V4L2_BUF_TYPE_VBI_CAPTURE,
        V4L2_BUF_TYPE_VBI_OUTPUT,
        V4L2_BUF_TYPE_SLICED_VBI_CAPTURE,
        V4L2_BUF_TYPE_SLICED_VBI_OUTPUT,
        V4L2_BUF_TYPE_VIDEO_OUTPUT_OVERLAY,
        V4L2_BUF_TYPE_VIDEO_CAPTURE_MPLANE,
        V4L2_BUF_TYPE_VIDEO_OUTPUT_MPLANE,
        V4L2_BUF_TYPE_SDR_CAPTURE,
        V4L2_BUF_TYPE_SDR_OUTPUT,
    ]
}

const V4L2_CAP_VIDEO_CAPTURE: u32 = 0x0000_0001;
const V4L2_CAP_VIDEO_OUTPUT: u32 = 0x0000_0002;
const V4L2_CAP_VIDEO_OVERLAY: u32 = 0x0000_0004;
const V4L2_CAP_VBI_CAPTURE: u32 = 0x0000_0010;
const V4L2_CAP_VBI_OUTPUT: u32 = 0x0000_0020;
const V4L2_CAP_SLICED_VBI_CAPTURE: u32 = 0x0000_0040;
const V4L2_CAP_SLICED_VBI_OUTPUT: u32 = 0x0000_0080;
const V4L2_CAP_RDS_CAPTURE: u32 = 0x0000_0100;
const V4L2_CAP_VIDEO_OUTPUT_OVERLAY: u32 = 0x0000_0200;
const V4L2_CAP_HW_FREQ_SEEK: u32 = 0x0000_0400;
const V4L2_CAP_RDS_OUTPUT: u32 = 0x0000_0800;
const V4L2_CAP_VIDEO_CAPTURE_MPLANE: u32 = 0x0000_1000;
const V4L2_CAP_VIDEO_OUTPUT_MPLANE: u32 = 0x0000_2000;
const V4L2_CAP_VIDEO_M2M_MPLANE: u32 = 0x0000_4000;
const V4L2_CAP_VIDEO_M2M: u32 = 0x0000_8000;
const V4L2_CAP_TUNER: u32 = 0x0001_0000;
const V4L2_CAP_AUDIO: u32 = 0x0002_0000;
const V4L2_CAP_RADIO: u32 = 0x0004_0000;
const V4L2_CAP_MODULATOR: u32 = 0x0008_0000;
const V4L2_CAP_SDR_CAPTURE: u32 = 0x0010_0000;
const V4L2_CAP_EXT_PIX_FORMAT: u32 = 0x0020_0000;
const V4L2_CAP_SDR_OUTPUT: u32 = 0x0040_0000;
const V4L2_CAP_READWRITE: u32 = 0x0100_0000;
const V4L2_CAP_ASYNCIO: u32 = 0x0200_0000;
const V4L2_CAP_STREAMING: u32 = 0x0400_0000;
const V4L2_CAP_DEVICE_CAPS: u32 = 0x8000_0000;

xlat! {
    V4L2_DEVICE_CAPABILITIES_FLAGS = [
        V4L2_CAP_VIDEO_CAPTURE,
        V4L2_CAP_VIDEO_OUTPUT,
        V4L2_CAP_VIDEO_OVERLAY,
        V4L2_CAP_VBI_CAPTURE,
        V4L2_CAP_VBI_OUTPUT,
        V4L2_CAP_SLICED_VBI_CAPTURE,
        V4L2_CAP_SLICED_VBI_OUTPUT,
        V4L2_CAP_RDS_CAPTURE,
        V4L2_CAP_VIDEO_OUTPUT_OVERLAY,
        V4L2_CAP_HW_FREQ_SEEK,
        V4L2_CAP_RDS_OUTPUT,
        V4L2_CAP_VIDEO_CAPTURE_MPLANE,
        V4L2_CAP_VIDEO_OUTPUT_MPLANE,
        V4L2_CAP_VIDEO_M2M_MPLANE,
        V4L2_CAP_VIDEO_M2M,
        V4L2_CAP_TUNER,
        V4L2_CAP_AUDIO,
        V4L2_CAP_RADIO,
        V4L2_CAP_MODULATOR,
        V4L2_CAP_SDR_CAPTURE,
        V4L2_CAP_EXT_PIX_FORMAT,
        V4L2_CAP_SDR_OUTPUT,
        V4L2_CAP_READWRITE,
        V4L2_CAP_ASYNCIO,
        V4L2_CAP_STREAMING,
        V4L2_CAP_DEVICE_CAPS,
    ]
}

const V4L2_CAP_TIMEPERFRAME: u32 = 0x1000;

xlat! { V4L2_STREAMING_CAPABILITIES = [V4L2_CAP_TIMEPERFRAME] }

const V4L2_MODE_HIGHQUALITY: u32 = 0x0001;

xlat! { V4L2_CAPTURE_MODES = [V4L2_MODE_HIGHQUALITY] }

const V4L2_FMT_FLAG_COMPRESSED: u32 = 0x0001;
const V4L2_FMT_FLAG_EMULATED: u32 = 0x0002;

xlat! { V4L2_FORMAT_DESCRIPTION_FLAGS = [V4L2_FMT_FLAG_COMPRESSED, V4L2_FMT_FLAG_EMULATED] }

const V4L2_FIELD_ANY: u32 = 0;
const V4L2_FIELD_NONE: u32 = 1;
const V4L2_FIELD_TOP: u32 = 2;
const V4L2_FIELD_BOTTOM: u32 = 3;
const V4L2_FIELD_INTERLACED: u32 = 4;
const V4L2_FIELD_SEQ_TB: u32 = 5;
const V4L2_FIELD_SEQ_BT: u32 = 6;
const V4L2_FIELD_ALTERNATE: u32 = 7;
const V4L2_FIELD_INTERLACED_TB: u32 = 8;
const V4L2_FIELD_INTERLACED_BT: u32 = 9;

xlat! {
    sorted V4L2_FIELDS = [
        V4L2_FIELD_ANY,
        V4L2_FIELD_NONE,
        V4L2_FIELD_TOP,
        V4L2_FIELD_BOTTOM,
        V4L2_FIELD_INTERLACED,
        V4L2_FIELD_SEQ_TB,
        V4L2_FIELD_SEQ_BT,
        V4L2_FIELD_ALTERNATE,
        V4L2_FIELD_INTERLACED_TB,
        V4L2_FIELD_INTERLACED_BT,
    ]
}

const V4L2_COLORSPACE_DEFAULT: u32 = 0;
const V4L2_COLORSPACE_SMPTE170M: u32 = 1;
const V4L2_COLORSPACE_SMPTE240M: u32 = 2;
const V4L2_COLORSPACE_REC709: u32 = 3;
const V4L2_COLORSPACE_BT878: u32 = 4;
const V4L2_COLORSPACE_470_SYSTEM_M: u32 = 5;
const V4L2_COLORSPACE_470_SYSTEM_BG: u32 = 6;
const V4L2_COLORSPACE_JPEG: u32 = 7;
const V4L2_COLORSPACE_SRGB: u32 = 8;
const V4L2_COLORSPACE_ADOBERGB: u32 = 9;
const V4L2_COLORSPACE_BT2020: u32 = 10;
const V4L2_COLORSPACE_RAW: u32 = 11;
const V4L2_COLORSPACE_DCI_P3: u32 = 12;

xlat! {
    sorted V4L2_COLORSPACES = [
        V4L2_COLORSPACE_DEFAULT,
        V4L2_COLORSPACE_SMPTE170M,
        V4L2_COLORSPACE_SMPTE240M,
        V4L2_COLORSPACE_REC709,
        V4L2_COLORSPACE_BT878,
        V4L2_COLORSPACE_470_SYSTEM_M,
        V4L2_COLORSPACE_470_SYSTEM_BG,
        V4L2_COLORSPACE_JPEG,
        V4L2_COLORSPACE_SRGB,
        V4L2_COLORSPACE_ADOBERGB,
        V4L2_COLORSPACE_BT2020,
        V4L2_COLORSPACE_RAW,
        V4L2_COLORSPACE_DCI_P3,
    ]
}

const V4L2_MEMORY_MMAP: u32 = 1;
const V4L2_MEMORY_USERPTR: u32 = 2;
const V4L2_MEMORY_OVERLAY: u32 = 3;
const V4L2_MEMORY_DMABUF: u32 = 4;

xlat! {
    sorted V4L2_MEMORIES = [
        V4L2_MEMORY_MMAP,
        V4L2_MEMORY_USERPTR,
        V4L2_MEMORY_OVERLAY,
        V4L2_MEMORY_DMABUF,
    ]
}

const V4L2_BUF_FLAG_MAPPED: u32 = 0x0000_0001;
const V4L2_BUF_FLAG_QUEUED: u32 = 0x0000_0002;
const V4L2_BUF_FLAG_DONE: u32 = 0x0000_0004;
const V4L2_BUF_FLAG_KEYFRAME: u32 = 0x0000_0008;
const V4L2_BUF_FLAG_PFRAME: u32 = 0x0000_0010;
const V4L2_BUF_FLAG_BFRAME: u32 = 0x0000_0020;
const V4L2_BUF_FLAG_ERROR: u32 = 0x0000_0040;
const V4L2_BUF_FLAG_TIMECODE: u32 = 0x0000_0100;
const V4L2_BUF_FLAG_PREPARED: u32 = 0x0000_0400;
const V4L2_BUF_FLAG_NO_CACHE_INVALIDATE: u32 = 0x0000_0800;
const V4L2_BUF_FLAG_NO_CACHE_CLEAN: u32 = 0x0000_1000;
const V4L2_BUF_FLAG_TIMESTAMP_MONOTONIC: u32 = 0x0000_2000;
const V4L2_BUF_FLAG_TIMESTAMP_COPY: u32 = 0x0000_4000;
const V4L2_BUF_FLAG_LAST: u32 = 0x0010_0000;

xlat! {
    V4L2_BUF_FLAGS = [
        V4L2_BUF_FLAG_MAPPED,
        V4L2_BUF_FLAG_QUEUED,
        V4L2_BUF_FLAG_DONE,
        V4L2_BUF_FLAG_KEYFRAME,
        V4L2_BUF_FLAG_PFRAME,
        V4L2_BUF_FLAG_BFRAME,
        V4L2_BUF_FLAG_ERROR,
        V4L2_BUF_FLAG_TIMECODE,
        V4L2_BUF_FLAG_PREPARED,
        V4L2_BUF_FLAG_NO_CACHE_INVALIDATE,
        V4L2_BUF_FLAG_NO_CACHE_CLEAN,
        V4L2_BUF_FLAG_TIMESTAMP_MONOTONIC,
        V4L2_BUF_FLAG_TIMESTAMP_COPY,
        V4L2_BUF_FLAG_LAST,
    ]
}

const V4L2_INPUT_TYPE_TUNER: u32 = 1;
const V4L2_INPUT_TYPE_CAMERA: u32 = 2;
const V4L2_INPUT_TYPE_TOUCH: u32 = 3;

xlat! { sorted V4L2_INPUT_TYPES = [V4L2_INPUT_TYPE_TUNER, V4L2_INPUT_TYPE_CAMERA, V4L2_INPUT_TYPE_TOUCH] }

const V4L2_CID_BASE: u32 = 0x0098_0900;
const V4L2_CID_BRIGHTNESS: u32 = V4L2_CID_BASE;
const V4L2_CID_CONTRAST: u32 = V4L2_CID_BASE + 1;
const V4L2_CID_SATURATION: u32 = V4L2_CID_BASE + 2;
const V4L2_CID_HUE: u32 = V4L2_CID_BASE + 3;
const V4L2_CID_AUDIO_VOLUME: u32 = V4L2_CID_BASE + 5;
const V4L2_CID_AUDIO_BALANCE: u32 = V4L2_CID_BASE + 6;
const V4L2_CID_AUDIO_BASS: u32 = V4L2_CID_BASE + 7;
const V4L2_CID_AUDIO_TREBLE: u32 = V4L2_CID_BASE + 8;
const V4L2_CID_AUDIO_MUTE: u32 = V4L2_CID_BASE + 9;
const V4L2_CID_AUDIO_LOUDNESS: u32 = V4L2_CID_BASE + 10;
const V4L2_CID_BLACK_LEVEL: u32 = V4L2_CID_BASE + 11;
const V4L2_CID_AUTO_WHITE_BALANCE: u32 = V4L2_CID_BASE + 12;
const V4L2_CID_DO_WHITE_BALANCE: u32 = V4L2_CID_BASE + 13;
const V4L2_CID_RED_BALANCE: u32 = V4L2_CID_BASE + 14;
const V4L2_CID_BLUE_BALANCE: u32 = V4L2_CID_BASE + 15;
const V4L2_CID_GAMMA: u32 = V4L2_CID_BASE + 16;
const V4L2_CID_EXPOSURE: u32 = V4L2_CID_BASE + 17;
const V4L2_CID_AUTOGAIN: u32 = V4L2_CID_BASE + 18;
const V4L2_CID_GAIN: u32 = V4L2_CID_BASE + 19;
const V4L2_CID_HFLIP: u32 = V4L2_CID_BASE + 20;
const V4L2_CID_VFLIP: u32 = V4L2_CID_BASE + 21;
const V4L2_CID_HCENTER: u32 = V4L2_CID_BASE + 22;
const V4L2_CID_VCENTER: u32 = V4L2_CID_BASE + 23;
const V4L2_CID_POWER_LINE_FREQUENCY: u32 = V4L2_CID_BASE + 24;
const V4L2_CID_HUE_AUTO: u32 = V4L2_CID_BASE + 25;
const V4L2_CID_WHITE_BALANCE_TEMPERATURE: u32 = V4L2_CID_BASE + 26;
const V4L2_CID_SHARPNESS: u32 = V4L2_CID_BASE + 27;
const V4L2_CID_BACKLIGHT_COMPENSATION: u32 = V4L2_CID_BASE + 28;
const V4L2_CID_CHROMA_AGC: u32 = V4L2_CID_BASE + 29;
const V4L2_CID_COLOR_KILLER: u32 = V4L2_CID_BASE + 30;
const V4L2_CID_COLORFX: u32 = V4L2_CID_BASE + 31;
const V4L2_CID_AUTOBRIGHTNESS: u32 = V4L2_CID_BASE + 32;
const V4L2_CID_BAND_STOP_FILTER: u32 = V4L2_CID_BASE + 33;
const V4L2_CID_ROTATE: u32 = V4L2_CID_BASE + 34;
const V4L2_CID_BG_COLOR: u32 = V4L2_CID_BASE + 35;
const V4L2_CID_CHROMA_GAIN: u32 = V4L2_CID_BASE + 36;
const V4L2_CID_ILLUMINATORS_1: u32 = V4L2_CID_BASE + 37;
const V4L2_CID_ILLUMINATORS_2: u32 = V4L2_CID_BASE + 38;
const V4L2_CID_MIN_BUFFERS_FOR_CAPTURE: u32 = V4L2_CID_BASE + 39;
const V4L2_CID_MIN_BUFFERS_FOR_OUTPUT: u32 = V4L2_CID_BASE + 40;
const V4L2_CID_ALPHA_COMPONENT: u32 = V4L2_CID_BASE + 41;
const V4L2_CID_COLORFX_CBCR: u32 = V4L2_CID_BASE + 42;

const V4L2_CID_CAMERA_CLASS_BASE: u32 = 0x009a_0900;
const V4L2_CID_EXPOSURE_AUTO: u32 = V4L2_CID_CAMERA_CLASS_BASE + 1;
const V4L2_CID_EXPOSURE_ABSOLUTE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 2;
const V4L2_CID_EXPOSURE_AUTO_PRIORITY: u32 = V4L2_CID_CAMERA_CLASS_BASE + 3;
const V4L2_CID_PAN_RELATIVE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 4;
const V4L2_CID_TILT_RELATIVE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 5;
const V4L2_CID_PAN_RESET: u32 = V4L2_CID_CAMERA_CLASS_BASE + 6;
const V4L2_CID_TILT_RESET: u32 = V4L2_CID_CAMERA_CLASS_BASE + 7;
const V4L2_CID_PAN_ABSOLUTE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 8;
const V4L2_CID_TILT_ABSOLUTE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 9;
const V4L2_CID_FOCUS_ABSOLUTE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 10;
const V4L2_CID_FOCUS_RELATIVE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 11;
const V4L2_CID_FOCUS_AUTO: u32 = V4L2_CID_CAMERA_CLASS_BASE + 12;
const V4L2_CID_ZOOM_ABSOLUTE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 13;
const V4L2_CID_ZOOM_RELATIVE: u32 = V4L2_CID_CAMERA_CLASS_BASE + 14;
const V4L2_CID_ZOOM_CONTINUOUS: u32 = V4L2_CID_CAMERA_CLASS_BASE + 15;
const V4L2_CID_PRIVACY: u32 = V4L2_CID_CAMERA_CLASS_BASE + 16;

xlat! {
    sorted V4L2_CONTROL_IDS = [
        V4L2_CID_BRIGHTNESS,
        V4L2_CID_CONTRAST,
        V4L2_CID_SATURATION,
        V4L2_CID_HUE,
        V4L2_CID_AUDIO_VOLUME,
        V4L2_CID_AUDIO_BALANCE,
        V4L2_CID_AUDIO_BASS,
        V4L2_CID_AUDIO_TREBLE,
        V4L2_CID_AUDIO_MUTE,
        V4L2_CID_AUDIO_LOUDNESS,
        V4L2_CID_BLACK_LEVEL,
        V4L2_CID_AUTO_WHITE_BALANCE,
        V4L2_CID_DO_WHITE_BALANCE,
        V4L2_CID_RED_BALANCE,
        V4L2_CID_BLUE_BALANCE,
        V4L2_CID_GAMMA,
        V4L2_CID_EXPOSURE,
        V4L2_CID_AUTOGAIN,
        V4L2_CID_GAIN,
        V4L2_CID_HFLIP,
        V4L2_CID_VFLIP,
        V4L2_CID_HCENTER,
        V4L2_CID_VCENTER,
        V4L2_CID_POWER_LINE_FREQUENCY,
        V4L2_CID_HUE_AUTO,
        V4L2_CID_WHITE_BALANCE_TEMPERATURE,
        V4L2_CID_SHARPNESS,
        V4L2_CID_BACKLIGHT_COMPENSATION,
        V4L2_CID_CHROMA_AGC,
        V4L2_CID_COLOR_KILLER,
        V4L2_CID_COLORFX,
        V4L2_CID_AUTOBRIGHTNESS,
        V4L2_CID_BAND_STOP_FILTER,
        V4L2_CID_ROTATE,
        V4L2_CID_BG_COLOR,
        V4L2_CID_CHROMA_GAIN,
        V4L2_CID_ILLUMINATORS_1,
        V4L2_CID_ILLUMINATORS_2,
        V4L2_CID_MIN_BUFFERS_FOR_CAPTURE,
        V4L2_CID_MIN_BUFFERS_FOR_OUTPUT,
        V4L2_CID_ALPHA_COMPONENT,
        V4L2_CID_COLORFX_CBCR,
        V4L2_CID_EXPOSURE_AUTO,
        V4L2_CID_EXPOSURE_ABSOLUTE,
        V4L2_CID_EXPOSURE_AUTO_PRIORITY,
        V4L2_CID_PAN_RELATIVE,
        V4L2_CID_TILT_RELATIVE,
        V4L2_CID_PAN_RESET,
        V4L2_CID_TILT_RESET,
        V4L2_CID_PAN_ABSOLUTE,
        V4L2_CID_TILT_ABSOLUTE,
        V4L2_CID_FOCUS_ABSOLUTE,
        V4L2_CID_FOCUS_RELATIVE,
        V4L2_CID_FOCUS_AUTO,
        V4L2_CID_ZOOM_ABSOLUTE,
        V4L2_CID_ZOOM_RELATIVE,
        V4L2_CID_ZOOM_CONTINUOUS,
        V4L2_CID_PRIVACY,
    ]
}

const V4L2_CTRL_TYPE_INTEGER: u32 = 1;
const V4L2_CTRL_TYPE_BOOLEAN: u32 = 2;
const V4L2_CTRL_TYPE_MENU: u32 = 3;
const V4L2_CTRL_TYPE_BUTTON: u32 = 4;
const V4L2_CTRL_TYPE_INTEGER64: u32 = 5;
const V4L2_CTRL_TYPE_CTRL_CLASS: u32 = 6;
const V4L2_CTRL_TYPE_STRING: u32 = 7;
const V4L2_CTRL_TYPE_BITMASK: u32 = 8;
const V4L2_CTRL_TYPE_INTEGER_MENU: u32 = 9;

xlat! {
    sorted V4L2_CONTROL_TYPES = [
        V4L2_CTRL_TYPE_INTEGER,
        V4L2_CTRL_TYPE_BOOLEAN,
        V4L2_CTRL_TYPE_MENU,
        V4L2_CTRL_TYPE_BUTTON,
        V4L2_CTRL_TYPE_INTEGER64,
        V4L2_CTRL_TYPE_CTRL_CLASS,
        V4L2_CTRL_TYPE_STRING,
        V4L2_CTRL_TYPE_BITMASK,
        V4L2_CTRL_TYPE_INTEGER_MENU,
    ]
}

const V4L2_CTRL_FLAG_DISABLED: u32 = 0x0001;
const V4L2_CTRL_FLAG_GRABBED: u32 = 0x0002;
const V4L2_CTRL_FLAG_READ_ONLY: u32 = 0x0004;
const V4L2_CTRL_FLAG_UPDATE: u32 = 0x0008;
const V4L2_CTRL_FLAG_INACTIVE: u32 = 0x0010;
const V4L2_CTRL_FLAG_SLIDER: u32 = 0x0020;
const V4L2_CTRL_FLAG_WRITE_ONLY: u32 = 0x0040;
const V4L2_CTRL_FLAG_VOLATILE: u32 = 0x0080;
const V4L2_CTRL_FLAG_HAS_PAYLOAD: u32 = 0x0100;
const V4L2_CTRL_FLAG_EXECUTE_ON_WRITE: u32 = 0x0200;

xlat! {
    V4L2_CONTROL_FLAGS = [
        V4L2_CTRL_FLAG_DISABLED,
        V4L2_CTRL_FLAG_GRABBED,
        V4L2_CTRL_FLAG_READ_ONLY,
        V4L2_CTRL_FLAG_UPDATE,
        V4L2_CTRL_FLAG_INACTIVE,
        V4L2_CTRL_FLAG_SLIDER,
        V4L2_CTRL_FLAG_WRITE_ONLY,
        V4L2_CTRL_FLAG_VOLATILE,
        V4L2_CTRL_FLAG_HAS_PAYLOAD,
        V4L2_CTRL_FLAG_EXECUTE_ON_WRITE,
    ]
}

const V4L2_CTRL_FLAG_NEXT_CTRL: u32 = 0x8000_0000;

const V4L2_CTRL_CLASS_USER: u32 = 0x0098_0000;
const V4L2_CTRL_CLASS_MPEG: u32 = 0x0099_0000;
const V4L2_CTRL_CLASS_CAMERA: u32 = 0x009a_0000;
const V4L2_CTRL_CLASS_FM_TX: u32 = 0x009b_0000;
const V4L2_CTRL_CLASS_FLASH: u32 = 0x009c_0000;
const V4L2_CTRL_CLASS_JPEG: u32 = 0x009d_0000;
const V4L2_CTRL_CLASS_IMAGE_SOURCE: u32 = 0x009e_0000;
const V4L2_CTRL_CLASS_IMAGE_PROC: u32 = 0x009f_0000;
const V4L2_CTRL_CLASS_DV: u32 = 0x00a0_0000;
const V4L2_CTRL_CLASS_FM_RX: u32 = 0x00a1_0000;
const V4L2_CTRL_CLASS_RF_TUNER: u32 = 0x00a2_0000;
const V4L2_CTRL_CLASS_DETECT: u32 = 0x00a3_0000;

xlat! {
    sorted V4L2_CONTROL_CLASSES = [
        V4L2_CTRL_CLASS_USER,
        V4L2_CTRL_CLASS_MPEG,
        V4L2_CTRL_CLASS_CAMERA,
        V4L2_CTRL_CLASS_FM_TX,
        V4L2_CTRL_CLASS_FLASH,
        V4L2_CTRL_CLASS_JPEG,
        V4L2_CTRL_CLASS_IMAGE_SOURCE,
        V4L2_CTRL_CLASS_IMAGE_PROC,
        V4L2_CTRL_CLASS_DV,
        V4L2_CTRL_CLASS_FM_RX,
        V4L2_CTRL_CLASS_RF_TUNER,
        V4L2_CTRL_CLASS_DETECT,
    ]
}

const V4L2_FRMSIZE_TYPE_DISCRETE: u32 = 1;
const V4L2_FRMSIZE_TYPE_CONTINUOUS: u32 = 2;
const V4L2_FRMSIZE_TYPE_STEPWISE: u32 = 3;

xlat! {
    sorted V4L2_FRAMESIZE_TYPES = [
        V4L2_FRMSIZE_TYPE_DISCRETE,
        V4L2_FRMSIZE_TYPE_CONTINUOUS,
        V4L2_FRMSIZE_TYPE_STEPWISE,
    ]
}

const V4L2_FRMIVAL_TYPE_DISCRETE: u32 = 1;
const V4L2_FRMIVAL_TYPE_CONTINUOUS: u32 = 2;
const V4L2_FRMIVAL_TYPE_STEPWISE: u32 = 3;

xlat! {
    sorted V4L2_FRAMEINTERVAL_TYPES = [
        V4L2_FRMIVAL_TYPE_DISCRETE,
        V4L2_FRMIVAL_TYPE_CONTINUOUS,
        V4L2_FRMIVAL_TYPE_STEPWISE,
    ]
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum V4l2Cmd {
    QueryCap,
    EnumFmt,
    GFmt,
    SFmt,
    ReqBufs,
    QueryBuf,
    GFbuf,
    SFbuf,
    Qbuf,
    Dqbuf,
    StreamOn,
    StreamOff,
    GParm,
    SParm,
    GStd,
    SStd,
    EnumStd,
    EnumInput,
    GCtrl,
    SCtrl,
    QueryCtrl,
    GInput,
    SInput,
    CropCap,
    GCrop,
    SCrop,
    TryFmt,
    GExtCtrls,
    SExtCtrls,
    TryExtCtrls,
    EnumFrameSizes,
    EnumFrameIntervals,
    CreateBufs,
}

impl V4l2Cmd {
    pub const ALL: [V4l2Cmd; 33] = [
        V4l2Cmd::QueryCap,
        V4l2Cmd::EnumFmt,
        V4l2Cmd::GFmt,
        V4l2Cmd::SFmt,
        V4l2Cmd::ReqBufs,
        V4l2Cmd::QueryBuf,
        V4l2Cmd::GFbuf,
        V4l2Cmd::SFbuf,
        V4l2Cmd::Qbuf,
        V4l2Cmd::Dqbuf,
        V4l2Cmd::StreamOn,
        V4l2Cmd::StreamOff,
        V4l2Cmd::GParm,
        V4l2Cmd::SParm,
        V4l2Cmd::GStd,
        V4l2Cmd::SStd,
        V4l2Cmd::EnumStd,
        V4l2Cmd::EnumInput,
        V4l2Cmd::GCtrl,
        V4l2Cmd::SCtrl,
        V4l2Cmd::QueryCtrl,
        V4l2Cmd::GInput,
        V4l2Cmd::SInput,
        V4l2Cmd::CropCap,
        V4l2Cmd::GCrop,
        V4l2Cmd::SCrop,
        V4l2Cmd::TryFmt,
        V4l2Cmd::GExtCtrls,
        V4l2Cmd::SExtCtrls,
        V4l2Cmd::TryExtCtrls,
        V4l2Cmd::EnumFrameSizes,
        V4l2Cmd::EnumFrameIntervals,
        V4l2Cmd::CreateBufs,
    ];

    /// Request code under `pers`, whose layouts fix the encoded argument size.
    pub fn code(self, pers: Personality) -> u32 {
        use V4l2Cmd::*;

        let t = IOCTL_TYPE;

        match self {
            QueryCap => ior(t, 0, Capability::size(pers)),
            EnumFmt => iowr(t, 2, FmtDesc::size(pers)),
            GFmt => iowr(t, 4, V4l2Format::size(pers)),
            SFmt => iowr(t, 5, V4l2Format::size(pers)),
            ReqBufs => iowr(t, 8, RequestBuffers::size(pers)),
            QueryBuf => iowr(t, 9, Buffer::size(pers)),
            GFbuf => ior(t, 10, Framebuffer::size(pers)),
            SFbuf => iow(t, 11, Framebuffer::size(pers)),
            Qbuf => iowr(t, 15, Buffer::size(pers)),
            Dqbuf => iowr(t, 17, Buffer::size(pers)),
            StreamOn => iow(t, 18, 4),
            StreamOff => iow(t, 19, 4),
            GParm => iowr(t, 21, StreamParm::size(pers)),
            SParm => iowr(t, 22, StreamParm::size(pers)),
            GStd => ior(t, 23, 8),
            SStd => iow(t, 24, 8),
            EnumStd => iowr(t, 25, Standard::size(pers)),
            EnumInput => iowr(t, 26, Input::size(pers)),
            GCtrl => iowr(t, 27, Control::size(pers)),
            SCtrl => iowr(t, 28, Control::size(pers)),
            QueryCtrl => iowr(t, 36, QueryCtrlArg::size(pers)),
            GInput => ior(t, 38, 4),
            SInput => iowr(t, 39, 4),
            CropCap => iowr(t, 58, CropCapArg::size(pers)),
            GCrop => iowr(t, 59, Crop::size(pers)),
            SCrop => iow(t, 60, Crop::size(pers)),
            TryFmt => iowr(t, 64, V4l2Format::size(pers)),
            GExtCtrls => iowr(t, 71, ExtControls::size(pers)),
            SExtCtrls => iowr(t, 72, ExtControls::size(pers)),
            TryExtCtrls => iowr(t, 73, ExtControls::size(pers)),
            EnumFrameSizes => iowr(t, 74, FrmSizeEnum::size(pers)),
            EnumFrameIntervals => iowr(t, 75, FrmIvalEnum::size(pers)),
            CreateBufs => iowr(t, 92, CreateBuffers::size(pers)),
        }
    }

    pub fn name(self) -> &'static str {
        use V4l2Cmd::*;

        match self {
            QueryCap => "VIDIOC_QUERYCAP",
            EnumFmt => "VIDIOC_ENUM_FMT",
            GFmt => "VIDIOC_G_FMT",
            SFmt => "VIDIOC_S_FMT",
            ReqBufs => "VIDIOC_REQBUFS",
            QueryBuf => "VIDIOC_QUERYBUF",
            GFbuf => "VIDIOC_G_FBUF",
            SFbuf => "VIDIOC_S_FBUF",
            Qbuf => "VIDIOC_QBUF",
            Dqbuf => "VIDIOC_DQBUF",
            StreamOn => "VIDIOC_STREAMON",
            StreamOff => "VIDIOC_STREAMOFF",
            GParm => "VIDIOC_G_PARM",
            SParm => "VIDIOC_S_PARM",
            GStd => "VIDIOC_G_STD",
            SStd => "VIDIOC_S_STD",
            EnumStd => "VIDIOC_ENUMSTD",
            EnumInput => "VIDIOC_ENUMINPUT",
            GCtrl => "VIDIOC_G_CTRL",
            SCtrl => "VIDIOC_S_CTRL",
            QueryCtrl => "VIDIOC_QUERYCTRL",
            GInput => "VIDIOC_G_INPUT",
            SInput => "VIDIOC_S_INPUT",
            CropCap => "VIDIOC_CROPCAP",
            GCrop => "VIDIOC_G_CROP",
            SCrop => "VIDIOC_S_CROP",
            TryFmt => "VIDIOC_TRY_FMT",
            GExtCtrls => "VIDIOC_G_EXT_CTRLS",
            SExtCtrls => "VIDIOC_S_EXT_CTRLS",
            TryExtCtrls => "VIDIOC_TRY_EXT_CTRLS",
            EnumFrameSizes => "VIDIOC_ENUM_FRAMESIZES",
            EnumFrameIntervals => "VIDIOC_ENUM_FRAMEINTERVALS",
            CreateBufs => "VIDIOC_CREATE_BUFS",
        }
    }

    pub fn from_code(code: u32, pers: Personality) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.code(pers) == code)
    }
}

/// `struct v4l2_fract`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Fract {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fetch for Fract {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { numerator: r.u32(), denominator: r.u32() }
    }
}

/// `struct v4l2_rect`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Fetch for Rect {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { left: r.i32(), top: r.i32(), width: r.u32(), height: r.u32() }
    }
}

/// `struct v4l2_capability`
struct Capability {
    driver: [u8; 16],
    card: [u8; 32],
    bus_info: [u8; 32],
    version: u32,
    capabilities: u32,
    device_caps: u32,
}

impl Fetch for Capability {
    fn read(r: &mut Reader<'_>) -> Self {
        let cap = Self {
            driver: r.bytes(),
            card: r.bytes(),
            bus_info: r.bytes(),
            version: r.u32(),
            capabilities: r.u32(),
            device_caps: r.u32(),
        };
        r.skip(12, 4);
        cap
    }
}

/// `struct v4l2_fmtdesc`
struct FmtDesc {
    index: u32,
    ty: u32,
    flags: u32,
    description: [u8; 32],
    pixelformat: u32,
}

impl Fetch for FmtDesc {
    fn read(r: &mut Reader<'_>) -> Self {
        let desc = Self {
            index: r.u32(),
            ty: r.u32(),
            flags: r.u32(),
            description: r.bytes(),
            pixelformat: r.u32(),
        };
        r.skip(16, 4);
        desc
    }
}

/// `struct v4l2_pix_format`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PixFormat {
    pub width: u32,
    pub height: u32,
    pub pixelformat: u32,
    pub field: u32,
    pub bytesperline: u32,
    pub sizeimage: u32,
    pub colorspace: u32,
}

impl Fetch for PixFormat {
    fn read(r: &mut Reader<'_>) -> Self {
        let pix = Self {
            width: r.u32(),
            height: r.u32(),
            pixelformat: r.u32(),
            field: r.u32(),
            bytesperline: r.u32(),
            sizeimage: r.u32(),
            colorspace: r.u32(),
        };
        // priv, flags, ycbcr_enc, quantization, xfer_func
        r.skip(20, 4);
        pix
    }
}

/// `struct v4l2_plane_pix_format`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlanePixFormat {
    pub sizeimage: u32,
    pub bytesperline: u32,
}

impl Fetch for PlanePixFormat {
    fn read(r: &mut Reader<'_>) -> Self {
        let plane = Self { sizeimage: r.u32(), bytesperline: r.u32() };
        r.skip(12, 2);
        plane
    }
}

/// `struct v4l2_pix_format_mplane`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PixFormatMplane {
    pub width: u32,
    pub height: u32,
    pub pixelformat: u32,
    pub field: u32,
    pub colorspace: u32,
    pub plane_fmt: [PlanePixFormat; VIDEO_MAX_PLANES],
    pub num_planes: u8,
}

impl Fetch for PixFormatMplane {
    fn read(r: &mut Reader<'_>) -> Self {
        r.set_packed();

        let width = r.u32();
        let height = r.u32();
        let pixelformat = r.u32();
        let field = r.u32();
        let colorspace = r.u32();
        let mut plane_fmt = [PlanePixFormat::default(); VIDEO_MAX_PLANES];
        for plane in plane_fmt.iter_mut() {
            *plane = r.record();
        }
        let num_planes = r.u8();

        Self { width, height, pixelformat, field, colorspace, plane_fmt, num_planes }
    }
}

/// The `fmt` union of `struct v4l2_format`, selected by the buffer type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Pix(PixFormat),
    PixMplane(PixFormatMplane),
    Unknown,
}

impl Format {
    fn read(ty: u32, mut r: Reader<'_>) -> Self {
        match ty {
            V4L2_BUF_TYPE_VIDEO_CAPTURE | V4L2_BUF_TYPE_VIDEO_OUTPUT => Format::Pix(PixFormat::read(&mut r)),
            V4L2_BUF_TYPE_VIDEO_CAPTURE_MPLANE | V4L2_BUF_TYPE_VIDEO_OUTPUT_MPLANE => {
                Format::PixMplane(PixFormatMplane::read(&mut r))
            },
            _ => Format::Unknown,
        }
    }
}

/// `struct v4l2_format`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct V4l2Format {
    pub ty: u32,
    pub fmt: Format,
}

/// Size of the `fmt` union; `struct v4l2_window` makes it pointer aligned.
const FORMAT_UNION_SIZE: usize = 200;

impl Fetch for V4l2Format {
    fn read(r: &mut Reader<'_>) -> Self {
        let ty = r.u32();
        let word = r.personality().word_size();
        let fmt = Format::read(ty, r.union(FORMAT_UNION_SIZE, word));
        Self { ty, fmt }
    }
}

/// `struct v4l2_requestbuffers`
struct RequestBuffers {
    count: u32,
    ty: u32,
    memory: u32,
}

impl Fetch for RequestBuffers {
    fn read(r: &mut Reader<'_>) -> Self {
        let req = Self { count: r.u32(), ty: r.u32(), memory: r.u32() };
        r.skip(8, 4);
        req
    }
}

/// `struct v4l2_buffer`
struct Buffer {
    index: u32,
    ty: u32,
    bytesused: u32,
    flags: u32,
    timestamp: Timeval,
    memory: u32,
    offset: u32,
    userptr: u64,
    length: u32,
}

impl Fetch for Buffer {
    fn read(r: &mut Reader<'_>) -> Self {
        let index = r.u32();
        let ty = r.u32();
        let bytesused = r.u32();
        let flags = r.u32();
        let _field = r.u32();
        let timestamp = r.record();
        // struct v4l2_timecode
        r.skip(16, 4);
        let _sequence = r.u32();
        let memory = r.u32();
        let word = r.personality().word_size();
        let m = r.union(word, word);
        let offset = m.clone().u32();
        let userptr = m.clone().ulong();
        let length = r.u32();
        // reserved2, reserved
        r.skip(8, 4);

        Self { index, ty, bytesused, flags, timestamp, memory, offset, userptr, length }
    }
}

/// `struct v4l2_framebuffer`
struct Framebuffer {
    capability: u32,
    flags: u32,
    base: u64,
}

impl Fetch for Framebuffer {
    fn read(r: &mut Reader<'_>) -> Self {
        let fb = Self { capability: r.u32(), flags: r.u32(), base: r.ptr() };
        r.record::<PixFormat>();
        fb
    }
}

/// `struct v4l2_captureparm` and `struct v4l2_outputparm`, which share a layout.
struct StreamParmBody {
    capability: u32,
    mode: u32,
    timeperframe: Fract,
    extendedmode: u32,
    buffers: u32,
}

impl Fetch for StreamParmBody {
    fn read(r: &mut Reader<'_>) -> Self {
        let body = Self {
            capability: r.u32(),
            mode: r.u32(),
            timeperframe: r.record(),
            extendedmode: r.u32(),
            buffers: r.u32(),
        };
        r.skip(16, 4);
        body
    }
}

/// `struct v4l2_streamparm`
struct StreamParm {
    ty: u32,
    parm: StreamParmBody,
}

impl Fetch for StreamParm {
    fn read(r: &mut Reader<'_>) -> Self {
        let ty = r.u32();
        let mut parm = r.union(200, 4);
        Self { ty, parm: StreamParmBody::read(&mut parm) }
    }
}

/// `struct v4l2_standard`
struct Standard {
    index: u32,
    name: [u8; 24],
    frameperiod: Fract,
    framelines: i32,
}

impl Fetch for Standard {
    fn read(r: &mut Reader<'_>) -> Self {
        let index = r.u32();
        let _id = r.u64();
        let std = Self { index, name: r.bytes(), frameperiod: r.record(), framelines: r.i32() };
        r.skip(16, 4);
        std
    }
}

/// `struct v4l2_input`
struct Input {
    index: u32,
    name: [u8; 32],
    ty: u32,
}

impl Fetch for Input {
    fn read(r: &mut Reader<'_>) -> Self {
        let input = Self { index: r.u32(), name: r.bytes(), ty: r.u32() };
        // audioset, tuner
        r.skip(8, 4);
        let _std = r.u64();
        // status, capabilities, reserved
        r.skip(20, 4);
        input
    }
}

/// `struct v4l2_control`
struct Control {
    id: u32,
    value: i32,
}

impl Fetch for Control {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { id: r.u32(), value: r.i32() }
    }
}

/// `struct v4l2_queryctrl`
struct QueryCtrlArg {
    id: u32,
    ty: u32,
    name: [u8; 32],
    minimum: i32,
    maximum: i32,
    step: i32,
    default_value: i32,
    flags: u32,
}

impl Fetch for QueryCtrlArg {
    fn read(r: &mut Reader<'_>) -> Self {
        let ctrl = Self {
            id: r.u32(),
            ty: r.u32(),
            name: r.bytes(),
            minimum: r.i32(),
            maximum: r.i32(),
            step: r.i32(),
            default_value: r.i32(),
            flags: r.u32(),
        };
        r.skip(8, 4);
        ctrl
    }
}

/// `struct v4l2_cropcap`
struct CropCapArg {
    ty: u32,
    bounds: Rect,
    defrect: Rect,
    pixelaspect: Fract,
}

impl Fetch for CropCapArg {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { ty: r.u32(), bounds: r.record(), defrect: r.record(), pixelaspect: r.record() }
    }
}

/// `struct v4l2_crop`
struct Crop {
    ty: u32,
    c: Rect,
}

impl Fetch for Crop {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { ty: r.u32(), c: r.record() }
    }
}

/// `struct v4l2_ext_controls`
struct ExtControls {
    ctrl_class: u32,
    count: u32,
    error_idx: u32,
    controls: u64,
}

impl Fetch for ExtControls {
    fn read(r: &mut Reader<'_>) -> Self {
        let ctrl_class = r.u32();
        let count = r.u32();
        let error_idx = r.u32();
        r.skip(8, 4);
        Self { ctrl_class, count, error_idx, controls: r.ptr() }
    }
}

/// `struct v4l2_ext_control`, which is packed.
struct ExtControl {
    id: u32,
    size: u32,
    value: i32,
    value64: i64,
    string: u64,
}

impl Fetch for ExtControl {
    fn read(r: &mut Reader<'_>) -> Self {
        r.set_packed();

        let id = r.u32();
        let size = r.u32();
        r.skip(4, 4);
        let u = r.union(8, 8);

        Self { id, size, value: u.clone().i32(), value64: u.clone().i64(), string: u.clone().ptr() }
    }
}

/// `struct v4l2_frmsizeenum`
struct FrmSizeEnum {
    index: u32,
    pixel_format: u32,
    ty: u32,
    sizes: [u32; 6],
}

impl Fetch for FrmSizeEnum {
    fn read(r: &mut Reader<'_>) -> Self {
        let index = r.u32();
        let pixel_format = r.u32();
        let ty = r.u32();
        let sizes = r.union(24, 4).u32s();
        r.skip(8, 4);
        Self { index, pixel_format, ty, sizes }
    }
}

/// `struct v4l2_frmivalenum`
struct FrmIvalEnum {
    index: u32,
    pixel_format: u32,
    width: u32,
    height: u32,
    ty: u32,
    intervals: [Fract; 3],
}

impl Fetch for FrmIvalEnum {
    fn read(r: &mut Reader<'_>) -> Self {
        let index = r.u32();
        let pixel_format = r.u32();
        let width = r.u32();
        let height = r.u32();
        let ty = r.u32();
        let mut u = r.union(24, 4);
        let intervals = [u.record(), u.record(), u.record()];
        r.skip(8, 4);
        Self { index, pixel_format, width, height, ty, intervals }
    }
}

/// `struct v4l2_create_buffers`
struct CreateBuffers {
    index: u32,
    count: u32,
    memory: u32,
    format: V4l2Format,
}

impl Fetch for CreateBuffers {
    fn read(r: &mut Reader<'_>) -> Self {
        let bufs = Self { index: r.u32(), count: r.u32(), memory: r.u32(), format: r.record() };
        r.skip(32, 4);
        bufs
    }
}

/// `v4l2_fourcc('a', 'b', 'c', 'd')`, characters in memory order.
fn print_pixelformat(p: &mut Printer<'_>, fourcc: u32) {
    p.tprints("v4l2_fourcc(");
    for (i, &c) in fourcc.to_le_bytes().iter().enumerate() {
        if i > 0 {
            p.tprints(", ");
        }
        match c {
            b'\'' | b'\\' => tprintf!(p, "'\\{}'", c as char),
            b' '..=0x7e => tprintf!(p, "'{}'", c as char),
            _ => tprintf!(p, "'\\x{:02x}'", c),
        }
    }
    p.tprints(")");
}

fn print_buf_type(p: &mut Printer<'_>, ty: u32) {
    p.printxval(&V4L2_BUF_TYPES, u64::from(ty), "V4L2_BUF_TYPE_???");
}

fn print_fract(p: &mut Printer<'_>, f: &Fract) {
    tprintf!(p, "{}/{}", f.numerator, f.denominator);
}

fn print_rect(p: &mut Printer<'_>, r: &Rect) {
    tprintf!(p, "{{left={}, top={}, width={}, height={}}}", r.left, r.top, r.width, r.height);
}

fn print_format_fmt(p: &mut Printer<'_>, prefix: &str, f: &V4l2Format) {
    match &f.fmt {
        Format::Pix(pix) => {
            p.tprints(prefix);
            tprintf!(p, "fmt.pix={{width={}, height={}, pixelformat=", pix.width, pix.height);
            print_pixelformat(p, pix.pixelformat);
            p.tprints(", field=");
            p.printxval(&V4L2_FIELDS, u64::from(pix.field), "V4L2_FIELD_???");
            tprintf!(p, ", bytesperline={}, sizeimage={}, colorspace=", pix.bytesperline, pix.sizeimage);
            p.printxval(&V4L2_COLORSPACES, u64::from(pix.colorspace), "V4L2_COLORSPACE_???");
            p.tprints("}");
        },
        Format::PixMplane(mp) => {
            p.tprints(prefix);
            tprintf!(p, "fmt.pix_mp={{width={}, height={}, pixelformat=", mp.width, mp.height);
            print_pixelformat(p, mp.pixelformat);
            p.tprints(", field=");
            p.printxval(&V4L2_FIELDS, u64::from(mp.field), "V4L2_FIELD_???");
            p.tprints(", colorspace=");
            p.printxval(&V4L2_COLORSPACES, u64::from(mp.colorspace), "V4L2_COLORSPACE_???");
            p.tprints(", plane_fmt=[");
            let planes = usize::from(mp.num_planes).min(VIDEO_MAX_PLANES);
            for (i, plane) in mp.plane_fmt[..planes].iter().enumerate() {
                if i > 0 {
                    p.tprints(", ");
                }
                tprintf!(p, "{{sizeimage={}, bytesperline={}}}", plane.sizeimage, plane.bytesperline);
            }
            tprintf!(p, "], num_planes={}}}", mp.num_planes);
        },
        Format::Unknown => {},
    }
}

/// Prints the separator and fetches the argument on entry. `None` if the address was
/// printed instead.
fn enter<T: Fetch>(p: &mut Printer<'_>, arg: u64) -> Option<T> {
    p.tprints(", ");
    p.umove_or_printaddr(arg)
}

/// The argument as updated by a successful call.
fn fetch_result<T: Fetch>(p: &mut Printer<'_>, arg: u64) -> Option<T> {
    if p.syserror() {
        None
    } else {
        p.umove(arg)
    }
}

fn print_capability(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        return Rval::NeedsExit;
    }

    let caps = match enter::<Capability>(p, arg) {
        Some(caps) => caps,
        None => return Rval::Decoded,
    };

    p.tprints("{driver=");
    p.print_quoted_string(&caps.driver, caps.driver.len(), QuoteStyle::ZERO_TERMINATED);
    p.tprints(", card=");
    p.print_quoted_string(&caps.card, caps.card.len(), QuoteStyle::ZERO_TERMINATED);
    p.tprints(", bus_info=");
    p.print_quoted_string(&caps.bus_info, caps.bus_info.len(), QuoteStyle::ZERO_TERMINATED);
    tprintf!(
        p,
        ", version={}.{}.{}, capabilities=",
        (caps.version >> 16) & 0xff,
        (caps.version >> 8) & 0xff,
        caps.version & 0xff
    );
    p.printflags(&V4L2_DEVICE_CAPABILITIES_FLAGS, u64::from(caps.capabilities), "V4L2_CAP_???");
    p.tprints(", device_caps=");
    p.printflags(&V4L2_DEVICE_CAPABILITIES_FLAGS, u64::from(caps.device_caps), "V4L2_CAP_???");
    p.tprints("}");

    Rval::Decoded
}

fn print_fmtdesc(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        let f = match enter::<FmtDesc>(p, arg) {
            Some(f) => f,
            None => return Rval::Decoded,
        };
        tprintf!(p, "{{index={}, type=", f.index);
        print_buf_type(p, f.ty);
        return Rval::NeedsExit;
    }

    if let Some(f) = fetch_result::<FmtDesc>(p, arg) {
        p.tprints(", flags=");
        p.printflags(&V4L2_FORMAT_DESCRIPTION_FLAGS, u64::from(f.flags), "V4L2_FMT_FLAG_???");
        p.tprints(", description=");
        p.print_quoted_string(&f.description, f.description.len(), QuoteStyle::ZERO_TERMINATED);
        p.tprints(", pixelformat=");
        print_pixelformat(p, f.pixelformat);
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_format(p: &mut Printer<'_>, arg: u64, is_get: bool) -> Rval {
    if p.entering() {
        let f = match enter::<V4l2Format>(p, arg) {
            Some(f) => f,
            None => return Rval::Decoded,
        };
        p.tprints("{type=");
        print_buf_type(p, f.ty);
        if !is_get {
            print_format_fmt(p, ", ", &f);
        }
        return Rval::NeedsExit;
    }

    if let Some(f) = fetch_result::<V4l2Format>(p, arg) {
        print_format_fmt(p, if is_get { ", " } else { " => " }, &f);
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_requestbuffers(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        let req = match enter::<RequestBuffers>(p, arg) {
            Some(req) => req,
            None => return Rval::Decoded,
        };
        tprintf!(p, "{{count={}, type=", req.count);
        print_buf_type(p, req.ty);
        p.tprints(", memory=");
        p.printxval(&V4L2_MEMORIES, u64::from(req.memory), "V4L2_MEMORY_???");
        p.tprints("}");
        return Rval::NeedsExit;
    }

    if let Some(req) = fetch_result::<RequestBuffers>(p, arg) {
        p.tcp_mut().set_auxstr(format!("{{count={}}}", req.count));
    }

    Rval::Decoded
}

fn print_buffer(p: &mut Printer<'_>, cmd: V4l2Cmd, arg: u64) -> Rval {
    let dqbuf = cmd == V4l2Cmd::Dqbuf;

    if p.entering() {
        let b = match enter::<Buffer>(p, arg) {
            Some(b) => b,
            None => return Rval::Decoded,
        };
        p.tprints("{type=");
        print_buf_type(p, b.ty);
        if !dqbuf {
            tprintf!(p, ", index={}", b.index);
        }
        return Rval::NeedsExit;
    }

    if let Some(b) = fetch_result::<Buffer>(p, arg) {
        if dqbuf {
            tprintf!(p, ", index={}", b.index);
        }
        p.tprints(", memory=");
        p.printxval(&V4L2_MEMORIES, u64::from(b.memory), "V4L2_MEMORY_???");

        match b.memory {
            V4L2_MEMORY_MMAP => tprintf!(p, ", m.offset={}", Hex(u64::from(b.offset))),
            V4L2_MEMORY_USERPTR => tprintf!(p, ", m.userptr={}", Hex(b.userptr)),
            _ => {},
        }

        tprintf!(p, ", length={}, bytesused={}, flags=", b.length, b.bytesused);
        p.printflags(&V4L2_BUF_FLAGS, u64::from(b.flags), "V4L2_BUF_FLAG_???");
        if dqbuf {
            tprintf!(
                p,
                ", timestamp = {{{}.{:06}}}",
                b.timestamp.tv_sec as u64,
                b.timestamp.tv_usec as u64
            );
        }
        p.tprints(", ...");
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_framebuffer(p: &mut Printer<'_>, arg: u64) -> Rval {
    if let Some(b) = enter::<Framebuffer>(p, arg) {
        tprintf!(
            p,
            "{{capability={}, flags={}, base={}}}",
            Hex(u64::from(b.capability)),
            Hex(u64::from(b.flags)),
            Hex(b.base)
        );
    }

    Rval::Decoded
}

fn print_buf_type_arg(p: &mut Printer<'_>, arg: u64) -> Rval {
    p.tprints(", ");
    let mut buf = [0; 4];
    if p.umoven_or_printaddr(arg, &mut buf) {
        p.tprints("[");
        print_buf_type(p, u32::from_ne_bytes(buf));
        p.tprints("]");
    }

    Rval::Decoded
}

fn print_streamparm(p: &mut Printer<'_>, arg: u64, is_get: bool) -> Rval {
    let s = if p.entering() {
        let s = match enter::<StreamParm>(p, arg) {
            Some(s) => s,
            None => return Rval::Decoded,
        };
        p.tprints("{type=");
        print_buf_type(p, s.ty);
        match s.ty {
            V4L2_BUF_TYPE_VIDEO_CAPTURE | V4L2_BUF_TYPE_VIDEO_OUTPUT => {
                if is_get {
                    return Rval::NeedsExit;
                }
                p.tprints(", ");
            },
            _ => {
                p.tprints("}");
                return Rval::Decoded;
            },
        }
        s
    } else {
        let s = match fetch_result::<StreamParm>(p, arg) {
            Some(s) => s,
            None => {
                p.tprints("}");
                return Rval::Decoded;
            },
        };
        p.tprints(if is_get { ", " } else { " => " });
        s
    };

    let parm = &s.parm;
    if s.ty == V4L2_BUF_TYPE_VIDEO_CAPTURE {
        p.tprints("parm.capture={capability=");
        p.printflags(&V4L2_STREAMING_CAPABILITIES, u64::from(parm.capability), "V4L2_CAP_???");
        p.tprints(", capturemode=");
        p.printflags(&V4L2_CAPTURE_MODES, u64::from(parm.mode), "V4L2_MODE_???");
        p.tprints(", timeperframe=");
        print_fract(p, &parm.timeperframe);
        tprintf!(p, ", extendedmode={}, readbuffers={}}}", parm.extendedmode, parm.buffers);
    } else {
        p.tprints("parm.output={capability=");
        p.printflags(&V4L2_STREAMING_CAPABILITIES, u64::from(parm.capability), "V4L2_CAP_???");
        tprintf!(p, ", outputmode={}", parm.mode);
        p.tprints(", timeperframe=");
        print_fract(p, &parm.timeperframe);
        tprintf!(p, ", extendedmode={}, writebuffers={}}}", parm.extendedmode, parm.buffers);
    }

    if p.exiting() {
        p.tprints("}");
        Rval::Decoded
    } else {
        Rval::NeedsExit
    }
}

fn print_standard(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        return match enter::<Standard>(p, arg) {
            Some(s) => {
                tprintf!(p, "{{index={}", s.index);
                Rval::NeedsExit
            },
            None => Rval::Decoded,
        };
    }

    if let Some(s) = fetch_result::<Standard>(p, arg) {
        p.tprints(", name=");
        p.print_quoted_string(&s.name, s.name.len(), QuoteStyle::ZERO_TERMINATED);
        p.tprints(", frameperiod=");
        print_fract(p, &s.frameperiod);
        tprintf!(p, ", framelines={}", s.framelines);
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_input(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        return match enter::<Input>(p, arg) {
            Some(i) => {
                tprintf!(p, "{{index={}", i.index);
                Rval::NeedsExit
            },
            None => Rval::Decoded,
        };
    }

    if let Some(i) = fetch_result::<Input>(p, arg) {
        p.tprints(", name=");
        p.print_quoted_string(&i.name, i.name.len(), QuoteStyle::ZERO_TERMINATED);
        p.tprints(", type=");
        p.printxval(&V4L2_INPUT_TYPES, u64::from(i.ty), "V4L2_INPUT_TYPE_???");
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_control(p: &mut Printer<'_>, arg: u64, is_get: bool) -> Rval {
    if p.entering() {
        let c = match enter::<Control>(p, arg) {
            Some(c) => c,
            None => return Rval::Decoded,
        };
        p.tprints("{id=");
        p.printxval(&V4L2_CONTROL_IDS, u64::from(c.id), "V4L2_CID_???");
        if !is_get {
            tprintf!(p, ", value={}", c.value);
        }
        return Rval::NeedsExit;
    }

    if let Some(c) = fetch_result::<Control>(p, arg) {
        p.tprints(if is_get { ", " } else { " => " });
        tprintf!(p, "value={}", c.value);
    }
    p.tprints("}");

    Rval::Decoded
}

/// Prints the control id. Returns whether it carried `V4L2_CTRL_FLAG_NEXT_CTRL`.
fn print_queryctrl_id(p: &mut Printer<'_>, id: u32) -> bool {
    let next = id & V4L2_CTRL_FLAG_NEXT_CTRL != 0;
    if next {
        p.tprints("V4L2_CTRL_FLAG_NEXT_CTRL|");
    }
    p.printxval(&V4L2_CONTROL_IDS, u64::from(id & !V4L2_CTRL_FLAG_NEXT_CTRL), "V4L2_CID_???");
    next
}

fn print_queryctrl(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        let c = match enter::<QueryCtrlArg>(p, arg) {
            Some(c) => c,
            None => return Rval::Decoded,
        };
        p.tprints("{id=");
        if print_queryctrl_id(p, c.id) {
            p.tcp_mut().set_priv_data(PrivData::NextCtrl);
        }
        return Rval::NeedsExit;
    }

    let next = matches!(p.tcp_mut().take_priv_data(), Some(PrivData::NextCtrl));

    let c = match fetch_result::<QueryCtrlArg>(p, arg) {
        Some(c) => c,
        None => {
            p.tprints("}");
            return Rval::Decoded;
        },
    };

    // The driver replaces the id with that of the control it enumerated.
    if next {
        p.tprints(" => ");
        print_queryctrl_id(p, c.id);
    }

    p.tprints(", type=");
    p.printxval(&V4L2_CONTROL_TYPES, u64::from(c.ty), "V4L2_CTRL_TYPE_???");
    p.tprints(", name=");
    p.print_quoted_string(&c.name, c.name.len(), QuoteStyle::ZERO_TERMINATED);
    tprintf!(
        p,
        ", minimum={}, maximum={}, step={}, default_value={}, flags=",
        c.minimum,
        c.maximum,
        c.step,
        c.default_value
    );
    p.printflags(&V4L2_CONTROL_FLAGS, u64::from(c.flags), "V4L2_CTRL_FLAG_???");
    p.tprints("}");

    Rval::Decoded
}

fn print_cropcap(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        return match enter::<CropCapArg>(p, arg) {
            Some(c) => {
                p.tprints("{type=");
                print_buf_type(p, c.ty);
                Rval::NeedsExit
            },
            None => Rval::Decoded,
        };
    }

    if let Some(c) = fetch_result::<CropCapArg>(p, arg) {
        p.tprints(", bounds=");
        print_rect(p, &c.bounds);
        p.tprints(", defrect=");
        print_rect(p, &c.defrect);
        p.tprints(", pixelaspect=");
        print_fract(p, &c.pixelaspect);
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_crop(p: &mut Printer<'_>, arg: u64, is_get: bool) -> Rval {
    if p.entering() {
        let c = match enter::<Crop>(p, arg) {
            Some(c) => c,
            None => return Rval::Decoded,
        };
        p.tprints("{type=");
        print_buf_type(p, c.ty);
        if is_get {
            return Rval::NeedsExit;
        }
        p.tprints(", c=");
        print_rect(p, &c.c);
    } else if let Some(c) = fetch_result::<Crop>(p, arg) {
        p.tprints(", c=");
        print_rect(p, &c.c);
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_ext_control(p: &mut Printer<'_>, ctrl: &ExtControl) {
    p.tprints("{id=");
    p.printxval(&V4L2_CONTROL_IDS, u64::from(ctrl.id), "V4L2_CID_???");
    tprintf!(p, ", size={}", ctrl.size);
    if ctrl.size > 0 {
        p.tprints(", string=");
        p.printstr(ctrl.string, u64::from(ctrl.size));
    } else {
        tprintf!(p, ", value={}, value64={}", ctrl.value, ctrl.value64);
    }
    p.tprints("}");
}

fn print_ext_controls(p: &mut Printer<'_>, arg: u64, is_get: bool) -> Rval {
    let c = if p.entering() {
        let c = match enter::<ExtControls>(p, arg) {
            Some(c) => c,
            None => return Rval::Decoded,
        };
        p.tprints("{ctrl_class=");
        p.printxval(&V4L2_CONTROL_CLASSES, u64::from(c.ctrl_class), "V4L2_CTRL_CLASS_???");
        tprintf!(p, ", count={}", c.count);
        if c.count == 0 {
            p.tprints("}");
            return Rval::Decoded;
        }
        if is_get {
            return Rval::NeedsExit;
        }
        p.tprints(", ");
        c
    } else {
        // The kernel reports error_idx on failure, so fetch regardless of the outcome.
        let c = match p.umove::<ExtControls>(arg) {
            Some(c) => c,
            None => {
                p.tprints("}");
                return Rval::Decoded;
            },
        };
        p.tprints(if is_get { ", " } else { " => " });
        c
    };

    p.tprints("controls=");
    let pers = p.personality();
    let complete = p.print_array(
        c.controls,
        u64::from(c.count),
        ExtControl::size(pers),
        Fetcher::IgnoreSyserror,
        |p, elem| {
            print_ext_control(p, &ExtControl::parse(elem, pers));
            true
        },
    );

    if p.exiting() && p.syserror() {
        tprintf!(p, ", error_idx={}", c.error_idx);
    }

    if p.exiting() || !complete {
        p.tprints("}");
        return Rval::Decoded;
    }

    Rval::NeedsExit
}

fn print_frmsizeenum(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        let s = match enter::<FrmSizeEnum>(p, arg) {
            Some(s) => s,
            None => return Rval::Decoded,
        };
        tprintf!(p, "{{index={}, pixel_format=", s.index);
        print_pixelformat(p, s.pixel_format);
        return Rval::NeedsExit;
    }

    if let Some(s) = fetch_result::<FrmSizeEnum>(p, arg) {
        p.tprints(", type=");
        p.printxval(&V4L2_FRAMESIZE_TYPES, u64::from(s.ty), "V4L2_FRMSIZE_TYPE_???");
        let z = &s.sizes;
        match s.ty {
            V4L2_FRMSIZE_TYPE_DISCRETE => tprintf!(p, ", discrete={{width={}, height={}}}", z[0], z[1]),
            V4L2_FRMSIZE_TYPE_STEPWISE => tprintf!(
                p,
                ", stepwise={{min_width={}, max_width={}, step_width={}, min_height={}, max_height={}, \
                 step_height={}}}",
                z[0],
                z[1],
                z[2],
                z[3],
                z[4],
                z[5]
            ),
            _ => {},
        }
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_frmivalenum(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        let f = match enter::<FrmIvalEnum>(p, arg) {
            Some(f) => f,
            None => return Rval::Decoded,
        };
        tprintf!(p, "{{index={}, pixel_format=", f.index);
        print_pixelformat(p, f.pixel_format);
        tprintf!(p, ", width={}, height={}", f.width, f.height);
        return Rval::NeedsExit;
    }

    if let Some(f) = fetch_result::<FrmIvalEnum>(p, arg) {
        p.tprints(", type=");
        p.printxval(&V4L2_FRAMEINTERVAL_TYPES, u64::from(f.ty), "V4L2_FRMIVAL_TYPE_???");
        match f.ty {
            V4L2_FRMIVAL_TYPE_DISCRETE => {
                p.tprints(", discrete=");
                print_fract(p, &f.intervals[0]);
            },
            V4L2_FRMIVAL_TYPE_STEPWISE | V4L2_FRMIVAL_TYPE_CONTINUOUS => {
                p.tprints(", stepwise={min=");
                print_fract(p, &f.intervals[0]);
                p.tprints(", max=");
                print_fract(p, &f.intervals[1]);
                p.tprints(", step=");
                print_fract(p, &f.intervals[2]);
                p.tprints("}");
            },
            _ => {},
        }
    }
    p.tprints("}");

    Rval::Decoded
}

fn print_create_buffers(p: &mut Printer<'_>, arg: u64) -> Rval {
    if p.entering() {
        let b = match enter::<CreateBuffers>(p, arg) {
            Some(b) => b,
            None => return Rval::Decoded,
        };
        tprintf!(p, "{{count={}, memory=", b.count);
        p.printxval(&V4L2_MEMORIES, u64::from(b.memory), "V4L2_MEMORY_???");
        p.tprints(", format={type=");
        print_buf_type(p, b.format.ty);
        print_format_fmt(p, ", ", &b.format);
        p.tprints("}}");
        return Rval::NeedsExit;
    }

    if let Some(b) = fetch_result::<CreateBuffers>(p, arg) {
        p.tcp_mut().set_auxstr(format!("{{index={}, count={}}}", b.index, b.count));
    }

    Rval::Decoded
}

pub fn decode(p: &mut Printer<'_>, code: u32, arg: u64) -> Rval {
    use V4l2Cmd::*;

    if !p.verbose() {
        return Rval::NotDecoded;
    }

    let cmd = match V4l2Cmd::from_code(code, p.personality()) {
        Some(cmd) => cmd,
        None => return Rval::NotDecoded,
    };

    match cmd {
        QueryCap => print_capability(p, arg),
        EnumFmt => print_fmtdesc(p, arg),
        GFmt | SFmt | TryFmt => print_format(p, arg, cmd == GFmt),
        ReqBufs => print_requestbuffers(p, arg),
        QueryBuf | Qbuf | Dqbuf => print_buffer(p, cmd, arg),
        GFbuf if p.entering() => Rval::NeedsExit,
        GFbuf | SFbuf => print_framebuffer(p, arg),
        StreamOn | StreamOff => print_buf_type_arg(p, arg),
        GParm | SParm => print_streamparm(p, arg, cmd == GParm),
        GStd if p.entering() => Rval::NeedsExit,
        GStd | SStd => {
            p.tprints(", ");
            p.printnum_int64(arg, NumFmt::Hex);
            Rval::Decoded
        },
        EnumStd => print_standard(p, arg),
        EnumInput => print_input(p, arg),
        GCtrl | SCtrl => print_control(p, arg, cmd == GCtrl),
        QueryCtrl => print_queryctrl(p, arg),
        GInput if p.entering() => Rval::NeedsExit,
        GInput | SInput => {
            p.tprints(", ");
            p.printnum_int(arg, NumFmt::Unsigned);
            Rval::Decoded
        },
        CropCap => print_cropcap(p, arg),
        GCrop | SCrop => print_crop(p, arg, cmd == GCrop),
        GExtCtrls | SExtCtrls | TryExtCtrls => print_ext_controls(p, arg, cmd == GExtCtrls),
        EnumFrameSizes => print_frmsizeenum(p, arg),
        EnumFrameIntervals => print_frmivalenum(p, arg),
        CreateBufs => print_create_buffers(p, arg),
    }
}
