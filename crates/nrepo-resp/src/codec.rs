use std::io::BufRead;

use crate::error::{RespError, RespResult};

/// Maximum nesting depth accepted when parsing array replies.
const MAX_REPLY_DEPTH: usize = 8;

/// Maximum length accepted for a single bulk string or array reply.
///
/// Guards against a misbehaving server declaring an absurd length and
/// making the client allocate unbounded memory.
const MAX_REPLY_LEN: i64 = 512 * 1024 * 1024;

/// A parsed RESP server reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// `+OK\r\n`-style status line.
    Simple(String),
    /// `-ERR ...\r\n` error line.
    Error(String),
    /// `:42\r\n` integer.
    Integer(i64),
    /// `$<len>\r\n<bytes>\r\n` binary-safe bulk string.
    Bulk(Vec<u8>),
    /// `$-1\r\n` or `*-1\r\n` — absent value.
    Nil,
    /// `*<n>\r\n` followed by `n` nested replies.
    Array(Vec<Reply>),
}

/// Codec for the RESP wire protocol.
pub struct RespCodec;

impl RespCodec {
    /// Encode a command as an array of binary-safe bulk strings.
    pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + args.iter().map(|a| a.len() + 16).sum::<usize>());
        buf.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
        for arg in args {
            buf.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
            buf.extend_from_slice(arg);
            buf.extend_from_slice(b"\r\n");
        }
        buf
    }

    /// Read one complete reply from the stream.
    pub fn read_reply<R: BufRead>(reader: &mut R) -> RespResult<Reply> {
        Self::read_reply_at(reader, 0)
    }

    fn read_reply_at<R: BufRead>(reader: &mut R, depth: usize) -> RespResult<Reply> {
        if depth > MAX_REPLY_DEPTH {
            return Err(RespError::Protocol("reply nesting too deep".into()));
        }
        let line = read_line(reader)?;
        let (tag, rest) = line
            .split_first()
            .ok_or_else(|| RespError::Protocol("empty reply line".into()))?;
        match tag {
            b'+' => Ok(Reply::Simple(to_string(rest)?)),
            b'-' => Ok(Reply::Error(to_string(rest)?)),
            b':' => Ok(Reply::Integer(parse_int(rest)?)),
            b'$' => {
                let len = parse_int(rest)?;
                if len == -1 {
                    return Ok(Reply::Nil);
                }
                if !(0..=MAX_REPLY_LEN).contains(&len) {
                    return Err(RespError::Protocol(format!("bad bulk length {len}")));
                }
                let mut data = vec![0u8; len as usize];
                read_exact(reader, &mut data)?;
                let mut crlf = [0u8; 2];
                read_exact(reader, &mut crlf)?;
                if crlf != *b"\r\n" {
                    return Err(RespError::Protocol("bulk string missing CRLF".into()));
                }
                Ok(Reply::Bulk(data))
            }
            b'*' => {
                let len = parse_int(rest)?;
                if len == -1 {
                    return Ok(Reply::Nil);
                }
                if !(0..=MAX_REPLY_LEN).contains(&len) {
                    return Err(RespError::Protocol(format!("bad array length {len}")));
                }
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    items.push(Self::read_reply_at(reader, depth + 1)?);
                }
                Ok(Reply::Array(items))
            }
            other => Err(RespError::Protocol(format!(
                "unknown reply tag {:?}",
                *other as char
            ))),
        }
    }
}

/// Read a CRLF-terminated line, returning it without the terminator.
fn read_line<R: BufRead>(reader: &mut R) -> RespResult<Vec<u8>> {
    let mut line = Vec::new();
    let n = reader
        .read_until(b'\n', &mut line)
        .map_err(RespError::from_io)?;
    if n == 0 {
        return Err(RespError::Protocol("connection closed mid-reply".into()));
    }
    if !line.ends_with(b"\r\n") {
        return Err(RespError::Protocol("reply line missing CRLF".into()));
    }
    line.truncate(line.len() - 2);
    Ok(line)
}

fn read_exact<R: BufRead>(reader: &mut R, buf: &mut [u8]) -> RespResult<()> {
    reader.read_exact(buf).map_err(RespError::from_io)
}

fn to_string(bytes: &[u8]) -> RespResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| RespError::Protocol("non-utf8 status line".into()))
}

fn parse_int(bytes: &[u8]) -> RespResult<i64> {
    let s = std::str::from_utf8(bytes)
        .map_err(|_| RespError::Protocol("non-utf8 integer".into()))?;
    s.parse()
        .map_err(|_| RespError::Protocol(format!("invalid integer: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(bytes: &[u8]) -> RespResult<Reply> {
        RespCodec::read_reply(&mut Cursor::new(bytes))
    }

    // -----------------------------------------------------------------------
    // Command encoding
    // -----------------------------------------------------------------------

    #[test]
    fn encode_get_command() {
        let buf = RespCodec::encode_command(&[b"GET", b"key"]);
        assert_eq!(buf, b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
    }

    #[test]
    fn encode_is_binary_safe() {
        let value = [b'\r', b'\n', 0x00, 0xFF];
        let buf = RespCodec::encode_command(&[b"SET", b"k", &value]);
        let expected = [
            b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$4\r\n".as_slice(),
            value.as_slice(),
            b"\r\n".as_slice(),
        ]
        .concat();
        assert_eq!(buf, expected);
    }

    // -----------------------------------------------------------------------
    // Reply parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parse_simple_string() {
        assert_eq!(parse(b"+OK\r\n").unwrap(), Reply::Simple("OK".into()));
    }

    #[test]
    fn parse_error_line() {
        assert_eq!(
            parse(b"-ERR unknown command\r\n").unwrap(),
            Reply::Error("ERR unknown command".into())
        );
    }

    #[test]
    fn parse_integer() {
        assert_eq!(parse(b":42\r\n").unwrap(), Reply::Integer(42));
        assert_eq!(parse(b":-7\r\n").unwrap(), Reply::Integer(-7));
    }

    #[test]
    fn parse_bulk_string() {
        assert_eq!(
            parse(b"$5\r\nhello\r\n").unwrap(),
            Reply::Bulk(b"hello".to_vec())
        );
        assert_eq!(parse(b"$0\r\n\r\n").unwrap(), Reply::Bulk(Vec::new()));
    }

    #[test]
    fn parse_nil_bulk_and_array() {
        assert_eq!(parse(b"$-1\r\n").unwrap(), Reply::Nil);
        assert_eq!(parse(b"*-1\r\n").unwrap(), Reply::Nil);
    }

    #[test]
    fn parse_scan_shaped_array() {
        let wire = b"*2\r\n$1\r\n0\r\n*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n";
        assert_eq!(
            parse(wire).unwrap(),
            Reply::Array(vec![
                Reply::Bulk(b"0".to_vec()),
                Reply::Array(vec![
                    Reply::Bulk(b"foo".to_vec()),
                    Reply::Bulk(b"bar".to_vec()),
                ]),
            ])
        );
    }

    #[test]
    fn truncated_reply_is_protocol_error() {
        assert!(matches!(parse(b"$5\r\nhel"), Err(RespError::Protocol(_))));
        assert!(matches!(parse(b"+OK"), Err(RespError::Protocol(_))));
        assert!(matches!(parse(b""), Err(RespError::Protocol(_))));
    }

    #[test]
    fn unknown_tag_is_protocol_error() {
        assert!(matches!(parse(b"?what\r\n"), Err(RespError::Protocol(_))));
    }

    #[test]
    fn absurd_bulk_length_is_rejected() {
        assert!(matches!(
            parse(b"$99999999999\r\n"),
            Err(RespError::Protocol(_))
        ));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut wire = Vec::new();
        for _ in 0..20 {
            wire.extend_from_slice(b"*1\r\n");
        }
        wire.extend_from_slice(b":1\r\n");
        assert!(matches!(parse(&wire), Err(RespError::Protocol(_))));
    }
}
