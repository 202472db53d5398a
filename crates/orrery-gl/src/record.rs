use std::collections::HashMap;

use crate::error::GlError;

/// Primitive topology of a recording.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Topology {
    Lines,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    /// wgpu has no fan topology; fans draw as an indexed triangle list
    /// (see `RecordingBuffers::fan_indices`).
    pub(crate) fn hardware(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::Triangles | Topology::TriangleFan => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Options accepted by `GlContext::begin`.
#[derive(Debug, Copy, Clone, Default)]
pub struct RecordOpts {
    /// Capture the current color at every vertex call, producing a
    /// per-vertex color buffer on the sealed recording.
    pub save_colors: bool,
    /// Accepted for source compatibility; normals are still copied from the
    /// current normal, never derived from geometry. See `GlContext::begin`.
    pub compute_normals: bool,
}

/// GPU buffers owned by a sealed recording.
pub(crate) struct RecordingBuffers {
    pub positions: wgpu::Buffer,
    pub normals: wgpu::Buffer,
    pub colors: Option<wgpu::Buffer>,
    /// Index buffer expanding a triangle fan into a triangle list, with its
    /// index count.
    pub fan_indices: Option<(wgpu::Buffer, u32)>,
}

impl RecordingBuffers {
    /// Frees the GPU memory immediately rather than waiting for the handles
    /// to drop. Called when a recording is replaced under the same name.
    pub fn release(&self) {
        self.positions.destroy();
        self.normals.destroy();
        if let Some(colors) = &self.colors {
            colors.destroy();
        }
        if let Some((indices, _)) = &self.fan_indices {
            indices.destroy();
        }
    }
}

/// A named, reusable shape: topology, vertex count, and the GPU buffers
/// uploaded when the recording was sealed. Immutable once installed.
pub(crate) struct Recording {
    pub topology: Topology,
    pub vertex_count: u32,
    pub has_colors: bool,
    pub buffers: Option<RecordingBuffers>,
}

/// An open begin/end session accumulating vertex attributes on the CPU.
///
/// Invariant: `positions`, `normals`, and (when `save_colors`) `colors` stay
/// the same length — one entry per `vertex` call.
pub(crate) struct Session {
    pub name: String,
    pub topology: Topology,
    pub save_colors: bool,
    pub positions: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 4]>,
    pub colors: Vec<[f32; 4]>,
}

impl Session {
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// The recorder state machine (Idle → Recording → Idle, no nesting) plus the
/// name → recording table.
#[derive(Default)]
pub(crate) struct Recorder {
    session: Option<Session>,
    recordings: HashMap<String, Recording>,
}

impl Recorder {
    /// Opens a recording session. Line recordings cannot carry per-vertex
    /// colors; that combination is rejected up front.
    pub fn begin(&mut self, topology: Topology, name: &str, opts: RecordOpts) -> Result<(), GlError> {
        if let Some(open) = &self.session {
            return Err(GlError::AlreadyRecording(open.name.clone()));
        }
        if topology == Topology::Lines && opts.save_colors {
            return Err(GlError::LinesWithColors);
        }
        self.session = Some(Session {
            name: name.to_owned(),
            topology,
            save_colors: opts.save_colors,
            positions: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
        });
        Ok(())
    }

    /// Appends one vertex: the homogeneous position plus copies of the
    /// current normal and (if enabled) current color.
    pub fn push_vertex(
        &mut self,
        position: [f32; 3],
        normal: [f32; 4],
        color: [f32; 4],
    ) -> Result<(), GlError> {
        let session = self.session.as_mut().ok_or(GlError::NotRecording)?;
        session
            .positions
            .push([position[0], position[1], position[2], 1.0]);
        session.normals.push(normal);
        if session.save_colors {
            session.colors.push(color);
        }
        Ok(())
    }

    /// Closes the session and hands back the accumulated attributes for
    /// upload. The recorder returns to Idle.
    pub fn finish(&mut self) -> Result<Session, GlError> {
        self.session.take().ok_or(GlError::NotRecording)
    }

    /// Installs a sealed recording, replacing (and releasing the GPU buffers
    /// of) any prior entry under the same name.
    pub fn install(&mut self, name: String, recording: Recording) {
        if let Some(previous) = self.recordings.insert(name.clone(), recording) {
            if let Some(buffers) = &previous.buffers {
                buffers.release();
            }
            log::debug!("replaced recording `{name}`");
        }
    }

    /// Looks up a recording for drawing. Drawing while a session is open is
    /// a protocol violation.
    pub fn get(&self, name: &str) -> Result<&Recording, GlError> {
        if let Some(open) = &self.session {
            return Err(GlError::DrawDuringRecording(open.name.clone()));
        }
        self.recordings
            .get(name)
            .ok_or_else(|| GlError::UnknownRecording(name.to_owned()))
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: [f32; 4] = [0.0, 0.0, 1.0, 0.0];
    const C: [f32; 4] = [1.0, 0.5, 0.25, 1.0];

    fn sealed(topology: Topology, vertex_count: u32, has_colors: bool) -> Recording {
        Recording {
            topology,
            vertex_count,
            has_colors,
            buffers: None,
        }
    }

    #[test]
    fn records_one_entry_per_vertex_call() {
        let mut r = Recorder::default();
        r.begin(Topology::Triangles, "tri", RecordOpts::default()).unwrap();
        r.push_vertex([0.0, 0.0, 0.0], N, C).unwrap();
        r.push_vertex([1.0, 0.0, 0.0], N, C).unwrap();
        r.push_vertex([0.0, 1.0, 0.0], N, C).unwrap();
        let session = r.finish().unwrap();
        assert_eq!(session.vertex_count(), 3);
        assert_eq!(session.topology, Topology::Triangles);
        assert_eq!(session.positions.len(), 3);
        assert_eq!(session.normals.len(), 3);
        assert!(session.colors.is_empty());
        assert_eq!(session.positions[1], [1.0, 0.0, 0.0, 1.0]);
        assert!(!r.is_recording());
    }

    #[test]
    fn colors_captured_only_when_requested() {
        let mut r = Recorder::default();
        let opts = RecordOpts { save_colors: true, ..Default::default() };
        r.begin(Topology::TriangleFan, "fan", opts).unwrap();
        r.push_vertex([0.0, 0.0, 0.0], N, C).unwrap();
        r.push_vertex([1.0, 0.0, 0.0], N, [0.0, 1.0, 0.0, 1.0]).unwrap();
        let session = r.finish().unwrap();
        assert_eq!(session.colors.len(), 2);
        assert_eq!(session.colors[0], C);
        assert_eq!(session.colors[1], [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn begin_while_recording_is_rejected() {
        let mut r = Recorder::default();
        r.begin(Topology::Lines, "wire", RecordOpts::default()).unwrap();
        let err = r.begin(Topology::Triangles, "tri", RecordOpts::default());
        assert!(matches!(err, Err(GlError::AlreadyRecording(name)) if name == "wire"));
    }

    #[test]
    fn lines_with_colors_is_rejected() {
        let mut r = Recorder::default();
        let opts = RecordOpts { save_colors: true, ..Default::default() };
        assert!(matches!(
            r.begin(Topology::Lines, "l", opts),
            Err(GlError::LinesWithColors)
        ));
        // The failed begin must not have opened a session.
        assert!(!r.is_recording());
    }

    #[test]
    fn vertex_and_end_outside_a_session_fail() {
        let mut r = Recorder::default();
        assert!(matches!(
            r.push_vertex([0.0; 3], N, C),
            Err(GlError::NotRecording)
        ));
        assert!(matches!(r.finish(), Err(GlError::NotRecording)));
    }

    #[test]
    fn draw_while_recording_is_rejected() {
        let mut r = Recorder::default();
        r.install("tri".into(), sealed(Topology::Triangles, 3, false));
        r.begin(Topology::Lines, "wire", RecordOpts::default()).unwrap();
        assert!(matches!(
            r.get("tri"),
            Err(GlError::DrawDuringRecording(name)) if name == "wire"
        ));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let r = Recorder::default();
        assert!(matches!(
            r.get("ghost"),
            Err(GlError::UnknownRecording(name)) if name == "ghost"
        ));
    }

    #[test]
    fn reinstall_replaces_the_entry() {
        let mut r = Recorder::default();
        r.install("x".into(), sealed(Topology::Triangles, 3, false));
        r.install("x".into(), sealed(Topology::TriangleStrip, 8, true));
        let rec = r.get("x").unwrap();
        assert_eq!(rec.vertex_count, 8);
        assert_eq!(rec.topology, Topology::TriangleStrip);
        assert!(rec.has_colors);
    }

    #[test]
    fn lookup_does_not_mutate() {
        let mut r = Recorder::default();
        r.install("x".into(), sealed(Topology::Triangles, 3, false));
        for _ in 0..3 {
            assert_eq!(r.get("x").unwrap().vertex_count, 3);
        }
    }

    #[test]
    fn fan_topology_draws_as_triangle_list() {
        assert_eq!(
            Topology::TriangleFan.hardware(),
            wgpu::PrimitiveTopology::TriangleList
        );
        assert_eq!(Topology::Lines.hardware(), wgpu::PrimitiveTopology::LineList);
        assert_eq!(
            Topology::TriangleStrip.hardware(),
            wgpu::PrimitiveTopology::TriangleStrip
        );
    }
}
