use crate::Packet;

/// Receives every packet read after a GDO0 edge
pub trait PacketListener {
    fn on_new_packet(&mut self, packet: &Packet);
}

impl<F> PacketListener for F
where
    F: FnMut(&Packet),
{
    fn on_new_packet(&mut self, packet: &Packet) {
        self(packet)
    }
}
