use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;
use reqwest::blocking::Client;
use resvg::{tiny_skia, usvg};

use crate::{
    config::{RenderFormat, RendererCfg},
    error::{SynthError, SynthResult},
    request::RenderRequest,
};

/// Something that turns a [`RenderRequest`] into a square RGBA diagram.
pub trait BoardRenderer {
    fn render(&self, request: &RenderRequest) -> SynthResult<RgbaImage>;
}

/// Client for the board-image HTTP service.
pub struct HttpBoardRenderer {
    client: Client,
    url: String,
    format: RenderFormat,
}

impl HttpBoardRenderer {
    pub fn new(cfg: &RendererCfg) -> SynthResult<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| SynthError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}/{}", cfg.base_url(), cfg.format.endpoint()),
            format: cfg.format,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl BoardRenderer for HttpBoardRenderer {
    fn render(&self, request: &RenderRequest) -> SynthResult<RgbaImage> {
        let res = self
            .client
            .get(&self.url)
            .query(&request.query())
            .send()
            .map_err(|e| SynthError::render("unreachable", e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            let reason = match body.trim() {
                "" => status.canonical_reason().unwrap_or("request failed").to_string(),
                text => text.to_string(),
            };
            return Err(SynthError::render(status, reason));
        }

        let bytes = res
            .bytes()
            .map_err(|e| SynthError::render(status, format!("reading body: {e}")))?;
        debug!("{} returned {} bytes", self.url, bytes.len());

        let size = request.size.get();
        let img = match self.format {
            RenderFormat::Png => decode_png(&bytes)?,
            RenderFormat::Svg => rasterize_svg(&bytes, size)?,
        };
        if img.dimensions() != (size, size) {
            return Err(SynthError::render(
                status,
                format!(
                    "expected a {size}x{size} board, got {}x{}",
                    img.width(),
                    img.height()
                ),
            ));
        }
        Ok(img)
    }
}

pub fn decode_png(bytes: &[u8]) -> SynthResult<RgbaImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|e| SynthError::render("200 OK", format!("undecodable png: {e}")))
}

/// Rasterizes an SVG diagram to `size`x`size` straight-alpha RGBA.
pub fn rasterize_svg(bytes: &[u8], size: u32) -> SynthResult<RgbaImage> {
    let undecodable = |msg: String| SynthError::render("200 OK", msg);

    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| undecodable(format!("undecodable svg: {e}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| undecodable(format!("cannot allocate {size}x{size} pixmap")))?;

    let sx = size as f32 / tree.size().width();
    let sy = size as f32 / tree.size().height();
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let mut img = RgbaImage::new(size, size);
    for (src, dst) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{BoardSize, ColorTheme};
    use board::Orientation;
    use std::{
        io::{BufRead, BufReader, Cursor, Write},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    fn request(size: u32) -> RenderRequest {
        RenderRequest {
            fen: "8/8/8/4k3/8/8/8/4K3 w - - 0 1".into(),
            orientation: Orientation::White,
            size: BoardSize::new(size).unwrap(),
            last_move: Some("e2e4".parse().unwrap()),
            check: None,
            colors: ColorTheme::Wikipedia,
            piece_set: "cburnett",
        }
    }

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 128]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Answers a single request and hands back its request line.
    fn serve_once(status: &'static str, body: Vec<u8>) -> (RendererCfg, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(&body).unwrap();
            request_line
        });
        let cfg = RendererCfg {
            port,
            ..RendererCfg::default()
        };
        (cfg, handle)
    }

    #[test]
    fn fetches_and_decodes_png() {
        let (cfg, server) = serve_once("200 OK", png_bytes(32, 32));
        let renderer = HttpBoardRenderer::new(&cfg).unwrap();
        let img = renderer.render(&request(32)).unwrap();
        assert_eq!(img.dimensions(), (32, 32));
        assert_eq!(img.get_pixel(5, 5), &Rgba([10, 20, 30, 128]));

        let line = server.join().unwrap();
        assert!(line.starts_with("GET /board.png?fen="), "{line}");
        assert!(line.contains("lastMove=e2e4"));
        assert!(line.contains("size=32"));
        assert!(line.contains("pieceSet=cburnett"));
    }

    #[test]
    fn non_success_status_is_a_render_error() {
        let (cfg, server) = serve_once("400 Bad Request", b"400: invalid fen".to_vec());
        let renderer = HttpBoardRenderer::new(&cfg).unwrap();
        let err = renderer.render(&request(32)).unwrap_err();
        server.join().unwrap();
        match err {
            SynthError::RenderService { status, reason } => {
                assert!(status.starts_with("400"));
                assert_eq!(reason, "400: invalid fen");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn garbage_body_is_a_render_error() {
        let (cfg, server) = serve_once("200 OK", b"definitely not a png".to_vec());
        let renderer = HttpBoardRenderer::new(&cfg).unwrap();
        let err = renderer.render(&request(32)).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, SynthError::RenderService { .. }));
    }

    #[test]
    fn wrong_size_is_a_render_error() {
        let (cfg, server) = serve_once("200 OK", png_bytes(32, 16));
        let renderer = HttpBoardRenderer::new(&cfg).unwrap();
        let err = renderer.render(&request(32)).unwrap_err();
        server.join().unwrap();
        assert!(err.to_string().contains("32x16"));
    }

    #[test]
    fn unreachable_service_is_a_render_error() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let cfg = RendererCfg {
            port,
            ..RendererCfg::default()
        };
        let err = HttpBoardRenderer::new(&cfg)
            .unwrap()
            .render(&request(32))
            .unwrap_err();
        assert!(matches!(err, SynthError::RenderService { .. }));
    }

    #[test]
    fn svg_is_rasterized_at_requested_size() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8" viewBox="0 0 8 8">
            <rect x="0" y="0" width="8" height="4" fill="#ff0000"/>
        </svg>"##;
        let img = rasterize_svg(svg, 64).unwrap();
        assert_eq!(img.dimensions(), (64, 64));
        assert_eq!(img.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(10, 50)[3], 0);
        assert!(rasterize_svg(b"<not svg", 64).is_err());
    }

    #[test]
    fn svg_endpoint_is_used_for_svg_format() {
        let cfg = RendererCfg {
            format: RenderFormat::Svg,
            ..RendererCfg::default()
        };
        let renderer = HttpBoardRenderer::new(&cfg).unwrap();
        assert_eq!(renderer.url(), "http://127.0.0.1:8080/board.svg");
    }
}
