use std::io::{self, Read};

/// A wrapper around a [`std::io::Read`] that drops emulation prevention bytes.
///
/// Any `0x03` byte that follows two consecutive `0x00` bytes is removed from the stream.
pub struct EmulationPreventionIo<I> {
    inner: I,
    zero_count: u8,
}

impl<I> EmulationPreventionIo<I> {
    /// Creates a new wrapper around the given reader.
    ///
    /// Bytes are read one at a time, so `inner` should be buffered or in memory.
    pub const fn new(inner: I) -> Self {
        Self { inner, zero_count: 0 }
    }
}

impl<I: io::Read> io::Read for EmulationPreventionIo<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read_size = 0;
        let mut one_byte = [0; 1];
        while buf.len() > read_size {
            if self.inner.read(&mut one_byte)? == 0 {
                break;
            }

            let byte = one_byte[0];
            match byte {
                0x03 if self.zero_count >= 2 => {
                    self.zero_count = 0;
                    continue;
                }
                0x00 => self.zero_count += 1,
                _ => self.zero_count = 0,
            }

            buf[read_size] = byte;
            read_size += 1;
        }

        Ok(read_size)
    }
}

/// Converts the bytes of a NAL unit (header included) into its RBSP form.
pub fn nal_to_rbsp(nal: &[u8]) -> io::Result<Vec<u8>> {
    let mut rbsp = Vec::with_capacity(nal.len());
    EmulationPreventionIo::new(nal).read_to_end(&mut rbsp)?;
    Ok(rbsp)
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::nal_to_rbsp;

    #[test]
    fn removes_emulation_prevention_bytes() {
        let nal = [0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x03, 0x00, 0x03, 0x00, 0x00, 0x00, 0x03];
        assert_eq!(
            nal_to_rbsp(&nal).unwrap(),
            [0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn keeps_plain_payload() {
        let nal = [0x00, 0x79, 0x00, 0x03, 0x80];
        assert_eq!(nal_to_rbsp(&nal).unwrap(), nal);
    }
}
