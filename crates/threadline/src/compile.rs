use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::platform::ShaderSources;

/// The fixed program every session compiles.
pub fn shader_sources() -> ShaderSources<'static> {
    ShaderSources {
        vertex: VERTEX_SHADER_GLSL,
        fragment: FRAGMENT_SHADER_GLSL,
    }
}

pub(crate) fn compile_vertex_shader(device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("threadline vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

pub(crate) fn compile_fragment_shader(device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("threadline fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Pass-through stage for the full-surface triangle; `uv` spans `[0, 2]` so the
/// visible area maps onto `[0, 1]`.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 position;
layout(location = 1) in vec2 uv;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = uv;
    gl_Position = vec4(position, 0.0, 1.0);
}
";

/// Layered noise-displaced lines.
///
/// The uniform block layout must match [`crate::UniformBlock`]. Names are
/// aliased through macros so the body reads in terms of the public uniform
/// contract (`iTime`, `iResolution`, `uColor`, `uAmplitude`, `uDistance`,
/// `uMouse`).
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform BackdropParams {
    vec3 _iResolution;
    float _iTime;
    vec3 _uColor;
    float _uAmplitude;
    vec2 _uMouse;
    float _uDistance;
    float _padding;
} ubo;

#define iResolution ubo._iResolution
#define iTime ubo._iTime
#define uColor ubo._uColor
#define uAmplitude ubo._uAmplitude
#define uMouse ubo._uMouse
#define uDistance ubo._uDistance

const int LINE_COUNT = 40;
const float LINE_WIDTH_PX = 7.0;
const float LINE_BLUR_PX = 10.0;

float gradient_noise(vec2 p) {
    vec2 cell = floor(p);
    vec4 frac4 = p.xyxy - vec4(cell, cell + 1.0);
    vec4 corners = vec4(cell.xy, cell.xy + 1.0);
    corners = corners - floor(corners * (1.0 / 71.0)) * 71.0;
    corners += vec2(26.0, 161.0).xyxy;
    corners *= corners;
    corners = corners.xzxz * corners.yyww;
    vec4 gx = fract(corners * (1.0 / 951.135664)) - 0.49999;
    vec4 gy = fract(corners * (1.0 / 642.949883)) - 0.49999;
    vec4 dots = inversesqrt(gx * gx + gy * gy) * (gx * frac4.xzxz + gy * frac4.yyww);
    dots *= 1.4142135623730950;
    vec2 fade = frac4.xy * frac4.xy * frac4.xy * (frac4.xy * (frac4.xy * 6.0 - 15.0) + 10.0);
    vec4 weights = vec4(fade, vec2(1.0 - fade));
    return dot(dots, weights.zxzx * weights.wwyy);
}

float px(float count) {
    return count / max(iResolution.x, iResolution.y);
}

float line_mask(vec2 st, float width, float perc) {
    float split_point = 0.1 + perc * 0.4;

    float envelope = smoothstep(split_point, 0.7, st.x);
    float strength = envelope * 0.5 * uAmplitude * (1.0 + (uMouse.y - 0.5) * 0.2);

    float t = iTime / 10.0 + (uMouse.x - 0.5);
    float blur = smoothstep(split_point, split_point + 0.05, st.x) * perc;

    float xnoise = mix(
        gradient_noise(vec2(t, st.x + perc) * 2.5),
        gradient_noise(vec2(t, st.x + t) * 3.5) / 1.5,
        st.x * 0.3
    );

    float y = 0.5 + (perc - 0.5) * uDistance + xnoise / 2.0 * strength;
    float feather = LINE_BLUR_PX * px(1.0) * blur;

    float upper = smoothstep(y + width / 2.0 + feather, y, st.y);
    float lower = smoothstep(y, y - width / 2.0 - feather, st.y);

    return clamp((upper - lower) * (1.0 - smoothstep(0.0, 1.0, pow(perc, 0.3))), 0.0, 1.0);
}

void main() {
    // wgpu places the origin top-left; the lines are laid out bottom-up.
    vec2 frag_coord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);
    vec2 st = frag_coord / iResolution.xy;

    float coverage = 1.0;
    for (int i = 0; i < LINE_COUNT; i++) {
        float perc = float(i) / float(LINE_COUNT);
        coverage *= 1.0 - line_mask(st, LINE_WIDTH_PX * px(1.0) * (1.0 - perc), perc);
    }

    float value = 1.0 - coverage;
    out_color = vec4(uColor * value, value);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_declares_the_uniform_contract() {
        for name in [
            "iTime",
            "iResolution",
            "uColor",
            "uAmplitude",
            "uDistance",
            "uMouse",
        ] {
            assert!(
                FRAGMENT_SHADER_GLSL.contains(&format!("#define {name} ubo._{name}")),
                "missing alias for {name}"
            );
        }
    }

    #[test]
    fn uniform_block_matches_cpu_layout() {
        let block_start = FRAGMENT_SHADER_GLSL
            .find("uniform BackdropParams")
            .expect("uniform block");
        let block = &FRAGMENT_SHADER_GLSL[block_start..];
        let order = ["_iResolution", "_iTime", "_uColor", "_uAmplitude", "_uMouse", "_uDistance"];
        let mut last = 0;
        for field in order {
            let at = block.find(field).expect(field);
            assert!(at > last, "{field} out of order");
            last = at;
        }
    }

    #[test]
    fn sources_are_version_450() {
        let sources = shader_sources();
        assert!(sources.vertex.starts_with("#version 450"));
        assert!(sources.fragment.starts_with("#version 450"));
        assert!(sources.vertex.contains("layout(location = 1) in vec2 uv"));
    }
}
