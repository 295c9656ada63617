use crate::foundation::core::{NodeId, Texture};
use crate::foundation::hash::{Fingerprint, StableHasher};
use crate::sink::SinkEvent;

/// Digest of everything a tick hands to the outside world: the final image, every presented
/// frame and every sink event, in order.
pub fn fingerprint_frame(
    image: &Texture,
    presented: &[(NodeId, Texture)],
    events: &[(NodeId, SinkEvent)],
) -> Fingerprint {
    let mut h = StableHasher::new();
    write_texture(&mut h, image);

    h.write_u64(presented.len() as u64);
    for (id, tex) in presented {
        h.write_u64(id.0);
        write_texture(&mut h, tex);
    }

    h.write_u64(events.len() as u64);
    for (id, ev) in events {
        h.write_u64(id.0);
        h.write_str(ev.name());
    }
    h.finish()
}

fn write_texture(h: &mut StableHasher, tex: &Texture) {
    h.write_u32(tex.width());
    h.write_u32(tex.height());
    h.write_bytes(tex.data());
}
