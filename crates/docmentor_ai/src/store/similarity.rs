use docmentor_core::config::DistanceMetric;

pub fn l2_norm(v: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for x in v {
        sum += x * x;
    }
    sum.sqrt()
}

pub fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    let mut dot = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
    }
    dot / (a_norm * b_norm)
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = x - y;
        sum += d * d;
    }
    sum
}

/// Larger means less similar. Cosine distance is `1 - cos`, and 1.0 when either side is zero.
pub fn distance(metric: DistanceMetric, query: &[f32], query_norm: f32, v: &[f32]) -> f32 {
    match metric {
        DistanceMetric::L2 => squared_l2(query, v),
        DistanceMetric::Cosine => {
            let v_norm = l2_norm(v);
            if query_norm == 0.0 || v_norm == 0.0 {
                1.0
            } else {
                1.0 - cosine_similarity(query, v, query_norm, v_norm)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_distance_is_squared() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(distance(DistanceMetric::L2, &[1.0, 1.0], 0.0, &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_distance_handles_zero_vectors() {
        let q = [1.0, 0.0];
        let n = l2_norm(&q);
        assert_eq!(distance(DistanceMetric::Cosine, &q, n, &[0.0, 0.0]), 1.0);
        assert!(distance(DistanceMetric::Cosine, &q, n, &[2.0, 0.0]).abs() < 1e-6);
        assert!((distance(DistanceMetric::Cosine, &q, n, &[0.0, 5.0]) - 1.0).abs() < 1e-6);
    }
}
