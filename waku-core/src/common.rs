pub mod protobuf_codec;
