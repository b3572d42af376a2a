use ssif_bus::I2cMaster;
use ssif_frame::{encode_request, FrameWriter, Request};
use tracing::debug;

use crate::error::Result;

/// Segment `request` and write every frame in bus order.
///
/// The first bus failure aborts the transmission; frames already sent are
/// left as they are.
pub(crate) fn transmit<M>(
    master: &mut M,
    writer: &mut FrameWriter,
    request: &Request<'_>,
) -> Result<()>
where
    M: I2cMaster + ?Sized,
{
    let frames = encode_request(request);
    debug!(
        address = %writer.address(),
        net_function = request.net_function(),
        command = request.command(),
        len = request.data().len(),
        frames = frames.len(),
        "transmitting request"
    );
    writer.write_all(master, &frames)?;
    Ok(())
}
