// FormatSelector - picks the stream to hand out from a stream index
//
// The index lists muxed and video-only streams in provider order. We want a
// single file the browser can save and play, so a muxed MPEG-4 stream is
// preferred. No bitrate or resolution comparison is done: provider order
// already puts the better streams first.

use super::models::CandidateStream;

/// Container label the stream index uses for MP4
pub const MUXED_CONTAINER: &str = "MPEG-4";

/// Format selector for stream-index responses
pub struct FormatSelector;

impl FormatSelector {
    /// First muxed MPEG-4 stream, else the first stream, else nothing
    pub fn select_best(candidates: &[CandidateStream]) -> Option<&CandidateStream> {
        candidates
            .iter()
            .find(|c| Self::is_muxed_mp4(c))
            .or_else(|| candidates.first())
    }

    /// MPEG-4 container carrying both audio and video
    fn is_muxed_mp4(candidate: &CandidateStream) -> bool {
        candidate.format == MUXED_CONTAINER && !candidate.is_video_only
    }
}
