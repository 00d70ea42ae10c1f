#[cfg(test)]
mod tests {
    use crate::config::{GridSource, LongitudeDecoder};
    use crate::io::loaders::{columns_to_grid, GridLoader, GridSourceType};
    use crate::parsing::table_parser::TableColumns;
    use approx::assert_abs_diff_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// Helper to create a temp file with the given content
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    fn write_rasters(dir: &TempDir, lon: &str, lat: &str, values: &str) -> GridSource {
        let paths = ["lon.dat", "lat.dat", "values.dat"].map(|name| dir.path().join(name));
        for (path, content) in paths.iter().zip([lon, lat, values]) {
            std::fs::write(path, content).unwrap();
        }
        let [longitude_grid, latitude_grid, values] = paths;
        GridSource::Raster {
            longitude_grid,
            latitude_grid,
            values,
        }
    }

    #[test]
    fn test_load_raster_map() {
        let dir = TempDir::new().unwrap();
        let source = write_rasters(
            &dir,
            "0 120 370\n0 120 370\n",
            "-10 -10 -10\n10 10 10\n",
            "0.1 0.2 0.3\nnan 0.5 0.6\n",
        );

        let result = GridLoader::load(&source, LongitudeDecoder::Degrees).unwrap();
        assert_eq!(result.source_type, GridSourceType::Raster);
        assert_eq!(result.num_samples, 6);

        let samples = result.grid.samples();
        assert_abs_diff_eq!(samples[2].position.lon().value(), 10.0, epsilon = 1e-12);
        assert_eq!(samples[4].position.lat().value(), 10.0);
        // no-data survives loading; it is absorbed later
        assert!(samples[3].value.is_nan());
    }

    #[test]
    fn test_raster_shape_mismatch() {
        let dir = TempDir::new().unwrap();
        let source = write_rasters(&dir, "0 1 2\n", "0 1\n", "1 1 1\n");

        let err = GridLoader::load(&source, LongitudeDecoder::Degrees).unwrap_err();
        assert!(format!("{:#}", err).contains("Raster shapes differ"));
    }

    #[test]
    fn test_raster_non_finite_coordinate() {
        let dir = TempDir::new().unwrap();
        let source = write_rasters(&dir, "0 nan\n", "0 1\n", "1 1\n");

        let msg = format!(
            "{:#}",
            GridLoader::load(&source, LongitudeDecoder::Degrees).unwrap_err()
        );
        assert!(msg.contains("Raster cell (1, 2)"), "unexpected message: {}", msg);
        assert!(msg.contains("Non-finite coordinate"));
    }

    #[test]
    fn test_missing_raster_file() {
        let dir = TempDir::new().unwrap();
        let source = GridSource::Raster {
            longitude_grid: dir.path().join("ra_grid.dat"),
            latitude_grid: dir.path().join("dec_grid.dat"),
            values: dir.path().join("values.dat"),
        };
        let msg = format!(
            "{:#}",
            GridLoader::load(&source, LongitudeDecoder::Degrees).unwrap_err()
        );
        assert!(msg.contains("longitude grid"));
    }

    #[test]
    fn test_load_table_with_hour_decoding() {
        let temp_file = create_temp_file("2.0,-30.0,12.5\n-6.0,15.0,\n");
        let source = GridSource::Table {
            path: temp_file.path().to_path_buf(),
        };

        let result = GridLoader::load(&source, LongitudeDecoder::NegativeHours).unwrap();
        assert_eq!(result.source_type, GridSourceType::Table);
        assert_eq!(result.num_samples, 2);

        let samples = result.grid.samples();
        assert_abs_diff_eq!(samples[0].position.lon().value(), 330.0, epsilon = 1e-9);
        assert_abs_diff_eq!(samples[1].position.lon().value(), 90.0, epsilon = 1e-9);
        assert_eq!(samples[0].value, 12.5);
        assert!(samples[1].value.is_nan());
    }

    #[test]
    fn test_table_missing_latitude_is_rejected() {
        let columns = TableColumns {
            angle_proxy: vec![1.0, 2.0],
            latitude: vec![5.0, f64::NAN],
            value: vec![1.0, 1.0],
        };
        let msg = format!(
            "{:#}",
            columns_to_grid(&columns, LongitudeDecoder::Degrees).unwrap_err()
        );
        assert!(msg.contains("Table row 2"));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let columns = TableColumns::default();
        assert!(columns_to_grid(&columns, LongitudeDecoder::Degrees).is_err());
    }
}
